use std::io::{BufRead, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use serde::Serialize;

use devkit_core::{DevkitConfig, OutputFormat};
use devkit_gitops::blame::BlameEntry;
use devkit_gitops::history::CommitRecord;
use devkit_gitops::release::Bump;
use devkit_gitops::{ProcessExecutor, VcsExecutor};

#[derive(Parser)]
#[command(
    name = "devkit",
    version,
    about = "Developer toolkit for everyday git work",
    long_about = "devkit wraps the git chores around a change: checking and analyzing diffs,\n\
                   resolving conflicts, digging through history, branching, committing\n\
                   and cutting releases, plus an assistant that turns a request into a shell command.\n\n\
                   Examples:\n  \
                     git diff | devkit analyze           Change statistics and risky patterns\n  \
                     git diff main | devkit impact       Scope, dependencies and test gaps\n  \
                     devkit resolve app.py --strategy ours  Keep our side of every conflict\n  \
                     devkit changelog v1.2.0             Changelog since a tag\n  \
                     devkit cli-command 'largest files here'  Ask for a shell command"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .devkit.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log every external command devkit runs
    #[arg(long, global = true)]
    debug: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Print a friendly greeting
    Hello {
        /// Who to greet
        #[arg(default_value = "World")]
        name: String,
    },
    /// Check that a diff is well-formed
    #[command(long_about = "Check that a diff is a well-formed unified diff.\n\n\
        Exits non-zero and names the offending line when it is not.\n\n\
        Examples:\n  git diff | devkit validate\n  devkit validate --file fix.patch")]
    Validate {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Change statistics and risky patterns of a diff
    Analyze {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Scope, dependency, API and test-coverage impact of a diff
    Impact {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Flag likely breaking changes in a diff
    Breaking {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Suggest reviewers from the authors of the touched files
    Reviewers {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Commit history of a file
    History {
        /// File to inspect
        path: String,
    },
    /// Line-by-line authorship of a file
    Blame {
        /// File to inspect
        path: String,
    },
    /// Search commit messages on every branch
    Find {
        /// Text to look for
        query: String,
    },
    /// List files with unresolved conflicts
    Conflicts,
    /// Resolve every conflict in a file by keeping one side
    #[command(long_about = "Resolve every conflict region in a file by keeping one side.\n\n\
        The file is rewritten and staged.\n\n\
        Examples:\n  devkit resolve src/app.py --strategy ours\n  devkit resolve README.md --strategy theirs")]
    Resolve {
        /// Conflicted file
        path: PathBuf,
        /// Side to keep
        #[arg(long, value_parser = ["ours", "theirs"])]
        strategy: String,
    },
    /// Abort the merge in progress
    AbortMerge,
    /// Create, switch, merge, list and delete branches
    Branch {
        #[command(subcommand)]
        action: BranchCommand,
    },
    /// Commit changes, with a generated message when none is given
    Commit {
        /// Commit message (default: summary of the staged diff)
        #[arg(long, short)]
        message: Option<String>,
        /// Files to stage before committing
        files: Vec<String>,
    },
    /// Amend the last commit
    Amend {
        /// Replacement message (default: keep the current one)
        #[arg(long, short)]
        message: Option<String>,
    },
    /// Stage files
    Stage {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Unstage files, keeping working-tree changes
    Unstage {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Stage individual hunks from patch files or stdin
    StageHunks {
        /// Patch files, one hunk each (default: read a patch from stdin)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },
    /// Bump the project version
    Bump {
        /// Component to increment
        part: BumpPart,
        /// Project root holding the version files
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Changelog for a range of commits
    Changelog {
        /// Start of the range, exclusive
        from: String,
        /// End of the range
        #[arg(default_value = "HEAD")]
        to: String,
    },
    /// Update npm and pip dependencies
    UpdateDeps {
        /// Project root holding package.json / requirements.txt
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Build a shell command from a plain-language request
    #[command(long_about = "Build a shell command from a plain-language request.\n\n\
        Sends the request to the configured OpenAI-compatible provider (Groq by default)\n\
        and asks before running the answer through the shell.\n\n\
        Examples:\n  devkit cli-command find the five largest files here\n  devkit cli-command --yes 'show disk usage'")]
    CliCommand {
        /// What the command should do
        #[arg(required = true, trailing_var_arg = true)]
        request: Vec<String>,
        /// Run the command without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Create a default .devkit.toml
    Init,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum BranchCommand {
    /// Create a branch and check it out
    Create {
        name: String,
        /// Start point (default: HEAD)
        #[arg(long)]
        base: Option<String>,
    },
    /// Check out a branch
    Switch { name: String },
    /// Merge a branch
    Merge {
        source: String,
        /// Branch to merge into (default: current branch)
        #[arg(long)]
        into: Option<String>,
    },
    /// List branches
    List {
        /// List remote-tracking branches
        #[arg(long, short)]
        remote: bool,
    },
    /// Delete a branch
    Delete {
        name: String,
        /// Delete even if unmerged
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BumpPart {
    Major,
    Minor,
    Patch,
}

impl From<BumpPart> for Bump {
    fn from(part: BumpPart) -> Self {
        match part {
            BumpPart::Major => Bump::Major,
            BumpPart::Minor => Bump::Minor,
            BumpPart::Patch => Bump::Patch,
        }
    }
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<DevkitConfig> {
    match path {
        Some(path) => DevkitConfig::from_file(path)
            .wrap_err_with(|| format!("loading {}", path.display())),
        None => {
            let default_path = Path::new(".devkit.toml");
            if default_path.exists() {
                Ok(DevkitConfig::from_file(default_path).wrap_err("loading .devkit.toml")?)
            } else {
                Ok(DevkitConfig::default())
            }
        }
    }
}

/// Every registered subcommand with its one-line help.
fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");
    if use_color {
        println!("\x1b[1m\x1b[32mdevkit\x1b[0m v{version}: your development assistant\n");
    } else {
        println!("devkit v{version}: your development assistant\n");
    }

    println!("Available commands:");
    let cli = Cli::command();
    for sub in cli.get_subcommands() {
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        if use_color {
            println!("  \x1b[32m{:<13}\x1b[0m {about}", sub.get_name());
        } else {
            println!("  {:<13} {about}", sub.get_name());
        }
    }
    println!("\nRun 'devkit <command> --help' for details.");
}

fn read_diff_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", OutputFormat::to_json(value)?);
    Ok(())
}

fn print_list(format: OutputFormat, title: &str, empty: &str, items: &[String]) -> Result<()> {
    print!("{}", format.render_list(title, empty, items)?);
    Ok(())
}

fn print_commits(format: OutputFormat, commits: &[CommitRecord], empty: &str) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(commits)?,
        OutputFormat::Markdown => {
            println!("| Commit | Author | Date | Message |");
            println!("|--------|--------|------|---------|");
            for c in commits {
                println!(
                    "| `{}` | {} | {} | {} |",
                    c.short_hash(),
                    c.author,
                    c.date.format("%Y-%m-%d"),
                    c.message
                );
            }
        }
        OutputFormat::Text => {
            if commits.is_empty() {
                println!("{empty}");
            }
            for c in commits {
                println!(
                    "{}  {}  {:<20}  {}",
                    c.short_hash(),
                    c.date.format("%Y-%m-%d %H:%M"),
                    c.author,
                    c.message
                );
            }
        }
    }
    Ok(())
}

fn print_blame(format: OutputFormat, entries: &[BlameEntry]) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(entries)?,
        OutputFormat::Markdown => {
            println!("| # | Commit | Author | Code |");
            println!("|---|--------|--------|------|");
            for e in entries {
                println!(
                    "| {} | `{}` | {} | `{}` |",
                    e.line_number,
                    e.hash.get(..7).unwrap_or(&e.hash),
                    e.author.as_deref().unwrap_or("?"),
                    e.code.as_deref().unwrap_or_default()
                );
            }
        }
        OutputFormat::Text => {
            for e in entries {
                println!(
                    "{:>5} {} {:<20} {}",
                    e.line_number,
                    e.hash.get(..7).unwrap_or(&e.hash),
                    e.author.as_deref().unwrap_or("?"),
                    e.code.as_deref().unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

/// Report a finished action: a line of text, or `{"ok": true, ...}` as JSON.
fn print_done(format: OutputFormat, message: &str, detail: serde_json::Value) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut body = serde_json::json!({ "ok": true, "message": message });
            if let (Some(map), serde_json::Value::Object(extra)) = (body.as_object_mut(), detail) {
                map.extend(extra);
            }
            print_json(&body)
        }
        _ => {
            println!("{message}");
            Ok(())
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush().into_diagnostic()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .into_diagnostic()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run_in_shell(command: &str) -> Result<std::process::ExitStatus> {
    let mut shell = if cfg!(windows) {
        let mut c = std::process::Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = std::process::Command::new("sh");
        c.arg("-c");
        c
    };
    shell
        .arg(command)
        .status()
        .into_diagnostic()
        .wrap_err("running generated command")
}

const DEFAULT_CONFIG: &str = r#"# devkit configuration

[assist]
# OpenAI-compatible provider used by `devkit cli-command`: groq, openai or ollama
# provider = "groq"
# model = "llama3-8b-8192"
# api_key = "..."            # default: $GROQ_API_KEY / $OPENAI_API_KEY
# base_url = "https://api.groq.com/openai/v1"
# timeout_secs = 60

[git]
# program = "git"

[release]
# Files searched, in order, for the version that `devkit bump` rewrites
# version_files = ["setup.py", "package.json", "VERSION", "__init__.py"]

[review]
# Changed-line count above which `devkit analyze` flags a diff
# high_impact_threshold = 100
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let config = load_config(cli.config.as_deref())?;
    tracing::info!(format = %cli.format, provider = %config.assist.provider, "configuration loaded");

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    let git = ProcessExecutor::new().with_git_program(config.git.program.clone());
    let format = cli.format;

    match cli.command {
        None => print_welcome(use_color),
        Some(Command::Hello { ref name }) => {
            if use_color {
                println!("\x1b[1m\x1b[34mHello, {name}! 👋\x1b[0m");
            } else {
                println!("Hello, {name}! 👋");
            }
        }
        Some(Command::Validate { ref file }) => {
            let input = read_diff_input(file)?;
            match devkit_difflens::validate(&input) {
                Ok(()) => match format {
                    OutputFormat::Json => print_json(&serde_json::json!({ "valid": true }))?,
                    _ => println!("Diff is valid"),
                },
                Err(err) => {
                    if format == OutputFormat::Json {
                        print_json(&serde_json::json!({
                            "valid": false,
                            "reason": err.to_string(),
                            "line": err.line(),
                        }))?;
                        std::process::exit(1);
                    }
                    miette::bail!(miette::miette!(
                        help = "Generate diffs with `git diff` or `diff -u`",
                        "Invalid diff: {err}"
                    ));
                }
            }
        }
        Some(Command::Analyze { ref file }) => {
            let input = read_diff_input(file)?;
            let report = devkit_difflens::analysis::analyze_with_threshold(
                &input,
                config.review.high_impact_threshold,
            );
            match format {
                OutputFormat::Json => print_json(&report)?,
                OutputFormat::Markdown => print!("{}", report.to_markdown()),
                OutputFormat::Text => print!("{report}"),
            }
        }
        Some(Command::Impact { ref file }) => {
            let input = read_diff_input(file)?;
            let impact = devkit_difflens::impact_analysis(&input);
            match format {
                OutputFormat::Json => print_json(&impact)?,
                OutputFormat::Markdown => print!("{}", impact.to_markdown()),
                OutputFormat::Text => print!("{impact}"),
            }
        }
        Some(Command::Breaking { ref file }) => {
            let input = read_diff_input(file)?;
            let findings = devkit_difflens::detect_breaking_changes(&input);
            print_list(format, "Potential breaking changes", "No breaking changes detected", &findings)?;
        }
        Some(Command::Reviewers { ref file }) => {
            let input = read_diff_input(file)?;
            let reviewers = devkit_gitops::reviewers::suggest_reviewers(&git, &input);
            print_list(format, "Suggested reviewers", "No reviewers found", &reviewers)?;
        }
        Some(Command::History { ref path }) => {
            let commits = devkit_gitops::history::file_history(&git, path);
            print_commits(format, &commits, &format!("No history for {path}"))?;
        }
        Some(Command::Blame { ref path }) => {
            let entries = devkit_gitops::blame::blame(&git, path);
            if entries.is_empty() && format != OutputFormat::Json {
                println!("No blame information for {path}");
            } else {
                print_blame(format, &entries)?;
            }
        }
        Some(Command::Find { ref query }) => {
            let commits = devkit_gitops::history::find_commit(&git, query);
            print_commits(format, &commits, &format!("No commits matching '{query}'"))?;
        }
        Some(Command::Conflicts) => {
            let files = devkit_gitops::conflict::find_conflicts(&git);
            print_list(format, "Conflicted files", "No conflicts", &files)?;
        }
        Some(Command::Resolve { ref path, ref strategy }) => {
            if !devkit_gitops::conflict::resolve_conflict(&git, path, strategy) {
                miette::bail!(miette::miette!(
                    help = "The file must contain <<<<<<< / ======= / >>>>>>> markers; rerun with --debug for details",
                    "Could not resolve {}",
                    path.display()
                ));
            }
            print_done(
                format,
                &format!("Resolved {} using {strategy} and staged it", path.display()),
                serde_json::json!({ "path": path, "strategy": strategy }),
            )?;
        }
        Some(Command::AbortMerge) => {
            if !devkit_gitops::conflict::abort_merge(&git) {
                miette::bail!("No merge to abort");
            }
            print_done(format, "Merge aborted", serde_json::json!({}))?;
        }
        Some(Command::Branch { ref action }) => run_branch(&git, format, action)?,
        Some(Command::Commit {
            ref message,
            ref files,
        }) => {
            let message = match message {
                Some(message) => message.clone(),
                None => {
                    let staged = git
                        .run(&["git", "diff", "--cached"])
                        .wrap_err("reading staged changes")?;
                    devkit_gitops::commit::smart_commit_message(&staged.stdout)
                }
            };
            devkit_gitops::commit::commit_changes(&git, &message, files)?;
            print_done(
                format,
                &format!("Committed: {message}"),
                serde_json::json!({ "commitMessage": message }),
            )?;
        }
        Some(Command::Amend { ref message }) => {
            devkit_gitops::commit::amend_commit(&git, message.as_deref())?;
            print_done(format, "Amended last commit", serde_json::json!({}))?;
        }
        Some(Command::Stage { ref files }) => {
            devkit_gitops::commit::stage_files(&git, files)?;
            print_done(format, &format!("Staged {} files", files.len()), serde_json::json!({ "files": files }))?;
        }
        Some(Command::Unstage { ref files }) => {
            devkit_gitops::commit::unstage_files(&git, files)?;
            print_done(format, &format!("Unstaged {} files", files.len()), serde_json::json!({ "files": files }))?;
        }
        Some(Command::StageHunks { ref files }) => {
            let hunks = if files.is_empty() {
                vec![read_diff_input(&None)?]
            } else {
                files
                    .iter()
                    .map(|path| read_diff_input(&Some(path.clone())))
                    .collect::<Result<Vec<_>>>()?
            };
            if hunks.iter().all(|h| h.trim().is_empty()) {
                miette::bail!(miette::miette!(
                    help = "Pipe a patch, e.g.: git diff -U0 app.py | devkit stage-hunks",
                    "Empty patch input"
                ));
            }
            devkit_gitops::commit::stage_hunks(&git, &hunks)?;
            print_done(format, &format!("Staged {} hunks", hunks.len()), serde_json::json!({}))?;
        }
        Some(Command::Bump { part, ref root }) => {
            let bumped =
                devkit_gitops::release::bump_version(root, &config.release.version_files, part.into())
                    .wrap_err("bumping version")?;
            match format {
                OutputFormat::Json => print_json(&bumped)?,
                _ => println!(
                    "{} -> {} in {}",
                    bumped.previous,
                    bumped.current,
                    bumped.file.display()
                ),
            }
        }
        Some(Command::Changelog { ref from, ref to }) => {
            let changelog = devkit_gitops::release::generate_changelog(&git, from, to)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "from": from,
                    "to": to,
                    "changelog": changelog,
                }))?,
                _ if changelog.is_empty() => println!("No commits between {from} and {to}"),
                _ => print!("{changelog}"),
            }
        }
        Some(Command::UpdateDeps { ref root }) => {
            let in_root = ProcessExecutor::new()
                .with_git_program(config.git.program.clone())
                .in_dir(root);
            let (success, messages) = devkit_gitops::release::update_dependencies(&in_root, root);
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "success": success,
                    "messages": messages,
                }))?,
                _ if messages.is_empty() => println!("No package.json or requirements.txt found"),
                _ => messages.iter().for_each(|m| println!("{m}")),
            }
            if !success {
                std::process::exit(1);
            }
        }
        Some(Command::CliCommand { ref request, yes }) => {
            run_cli_command(&config, format, &request.join(" "), yes).await?;
        }
        Some(Command::Init) => {
            let path = Path::new(".devkit.toml");
            if path.exists() {
                miette::bail!(".devkit.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .devkit.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "devkit", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn run_branch(git: &dyn VcsExecutor, format: OutputFormat, action: &BranchCommand) -> Result<()> {
    use devkit_gitops::branch;

    match action {
        BranchCommand::Create { name, base } => {
            branch::create_branch(git, name, base.as_deref())?;
            print_done(format, &format!("Created and switched to {name}"), serde_json::json!({ "branch": name }))
        }
        BranchCommand::Switch { name } => {
            branch::switch_branch(git, name)?;
            print_done(format, &format!("Switched to {name}"), serde_json::json!({ "branch": name }))
        }
        BranchCommand::Merge { source, into } => {
            let summary = branch::merge_branch(git, source, into.as_deref()).wrap_err_with(|| {
                format!("merging {source}; run `devkit conflicts` to see what needs resolving")
            })?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "ok": true,
                    "source": source,
                    "output": summary,
                })),
                _ => {
                    print!("{summary}");
                    Ok(())
                }
            }
        }
        BranchCommand::List { remote } => {
            let branches = branch::list_branches(git, *remote)?;
            print_list(format, "Branches", "No branches", &branches)
        }
        BranchCommand::Delete { name, force } => {
            branch::delete_branch(git, name, *force)?;
            print_done(format, &format!("Deleted {name}"), serde_json::json!({ "branch": name }))
        }
    }
}

async fn run_cli_command(
    config: &DevkitConfig,
    format: OutputFormat,
    request: &str,
    yes: bool,
) -> Result<()> {
    let client = devkit_assist::LlmClient::new(&config.assist)?;
    if !client.has_api_key() && config.assist.provider != "ollama" {
        let env_var = config.assist.api_key_env();
        miette::bail!(miette::miette!(
            help = format!("Set {env_var} (a .env file works) or add api_key under [assist] in .devkit.toml"),
            "No API key configured for provider '{}'",
            config.assist.provider
        ));
    }
    let builder = devkit_assist::CommandBuilder::new(client);
    tracing::info!(os = builder.os(), "generating command");

    let is_tty = std::io::stderr().is_terminal();
    let spinner = if is_tty {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .expect("spinner template"),
        );
        pb.set_message("Asking for a command...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let generated = builder.generate(request).await.inspect_err(|_e| {
        if let Some(pb) = &spinner {
            pb.finish_with_message("Failed");
        }
    })?;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match format {
        OutputFormat::Json => print_json(&generated)?,
        OutputFormat::Markdown => println!("```sh\n{}\n```", generated.command),
        OutputFormat::Text => println!("Generated command:\n  {}", generated.command),
    }

    let run = if yes {
        true
    } else if format == OutputFormat::Text && std::io::stdin().is_terminal() {
        confirm("Do you want to execute this command?")?
    } else {
        false
    };
    if run {
        eprintln!("Executing command...");
        let status = run_in_shell(&generated.command)?;
        if !status.success() {
            miette::bail!("command exited with {status}");
        }
    }
    Ok(())
}
