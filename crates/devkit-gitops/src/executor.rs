//! The seam between devkit and the processes it drives.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use devkit_core::{DevkitError, Result};
use tracing::debug;

/// Captured result of one external command.
///
/// # Examples
///
/// ```
/// use devkit_gitops::ExecOutput;
///
/// assert!(ExecOutput::ok("main\n").success());
/// assert!(!ExecOutput::failed(128, "fatal: not a git repository").success());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub status: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl ExecOutput {
    /// A zero-exit result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A non-zero-exit result with the given stderr.
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs an argument vector and reports its exit status and output.
///
/// `args[0]` is the program. Implementations return `Err` only when the
/// command could not be run at all; a non-zero exit is an `Ok` value the
/// caller inspects. Calls block until the process exits and impose no
/// timeout.
pub trait VcsExecutor {
    /// Run `args`, feeding `stdin` to the process when given.
    fn execute(&self, args: &[&str], stdin: Option<&str>) -> Result<ExecOutput>;

    /// Run `args` with no standard input.
    fn run(&self, args: &[&str]) -> Result<ExecOutput> {
        self.execute(args, None)
    }
}

/// Run `args` and turn a non-zero exit into [`DevkitError::Git`].
pub(crate) fn run_checked(
    exec: &dyn VcsExecutor,
    args: &[&str],
    stdin: Option<&str>,
) -> Result<ExecOutput> {
    let output = exec.execute(args, stdin)?;
    if output.success() {
        Ok(output)
    } else {
        Err(DevkitError::Git {
            command: args.join(" "),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        })
    }
}

/// [`VcsExecutor`] backed by real child processes.
///
/// # Examples
///
/// ```no_run
/// use devkit_gitops::{ProcessExecutor, VcsExecutor};
///
/// let exec = ProcessExecutor::new().in_dir("/path/to/repo");
/// let out = exec.run(&["git", "status", "--porcelain"]).unwrap();
/// println!("{}", out.stdout);
/// ```
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    git_program: String,
    cwd: Option<PathBuf>,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    /// Executor running in the current directory with `git` from `PATH`.
    pub fn new() -> Self {
        Self {
            git_program: "git".into(),
            cwd: None,
        }
    }

    /// Substitute `program` wherever a command starts with `git`.
    pub fn with_git_program(mut self, program: impl Into<String>) -> Self {
        self.git_program = program.into();
        self
    }

    /// Run every command inside `dir`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl VcsExecutor for ProcessExecutor {
    fn execute(&self, args: &[&str], stdin: Option<&str>) -> Result<ExecOutput> {
        let Some((&program, rest)) = args.split_first() else {
            return Err(DevkitError::Config("empty command line".into()));
        };
        let program = if program == "git" {
            self.git_program.as_str()
        } else {
            program
        };
        debug!(command = %args.join(" "), "running");

        let mut command = Command::new(program);
        command.args(rest);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = match stdin {
            None => command.output()?,
            Some(input) => {
                let mut child = command
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()?;
                if let Some(mut pipe) = child.stdin.take() {
                    pipe.write_all(input.as_bytes())?;
                }
                child.wait_with_output()?
            }
        };

        let result = ExecOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(command = %args.join(" "), status = ?result.status, "finished");
        Ok(result)
    }
}
