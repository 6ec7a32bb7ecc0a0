use std::io::Write;
use std::process::{Command, Output, Stdio};

const DIFF: &str = "\
diff --git a/app.js b/app.js
--- a/app.js
+++ b/app.js
@@ -1 +1,2 @@
 init();
+console.log(state);
";

fn devkit_with_stdin(args: &[&str], stdin: &str) -> Output {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .args(args)
        .current_dir(dir.path())
        .env("NO_COLOR", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn hello_defaults_to_world() {
    let output = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .arg("hello")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, World! 👋\n");
}

#[test]
fn hello_with_name() {
    let output = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .args(["--color", "never", "hello", "Ada"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, Ada! 👋\n");
}

#[test]
fn no_subcommand_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .current_dir(tempfile::tempdir().unwrap().path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["hello", "validate", "resolve", "cli-command"] {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
}

#[test]
fn validate_accepts_well_formed_diff() {
    let output = devkit_with_stdin(&["validate"], DIFF);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Diff is valid"));
}

#[test]
fn validate_json_reports_failing_line() {
    let output = devkit_with_stdin(&["--format", "json", "validate"], "--- a/f\n+++ b/f\n@@ bogus\n");
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["line"], 3);
    assert!(json["reason"]
        .as_str()
        .unwrap()
        .starts_with("Invalid hunk header format"));
}

#[test]
fn validate_text_fails_on_garbage() {
    let output = devkit_with_stdin(&["validate"], "not a diff");
    assert!(!output.status.success());
}

#[test]
fn analyze_json_from_stdin() {
    let output = devkit_with_stdin(&["--format", "json", "analyze"], DIFF);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["filesChanged"], 1);
    assert_eq!(json["insertions"], 1);
    assert_eq!(json["riskyPatterns"][0], "app.js: console.log");
}

#[test]
fn analyze_reads_file_argument() {
    let dir = tempfile::tempdir().unwrap();
    let patch = dir.path().join("change.patch");
    std::fs::write(&patch, DIFF).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .args(["--format", "markdown", "analyze", "--file"])
        .arg(&patch)
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("# Change Analysis"));
}

#[test]
fn analyze_honors_configured_threshold() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".devkit.toml"),
        "[review]\nhigh_impact_threshold = 0\n",
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_devkit"))
        .args(["--format", "json", "analyze"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(DIFF.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["highImpactFiles"][0], "app.js");
}

#[test]
fn breaking_json_lists_findings() {
    let diff = "diff --git a/api.py b/api.py\n-def fetch(url):\n+def fetch(url, timeout):\n";
    let output = devkit_with_stdin(&["--format", "json", "breaking"], diff);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!(["api.py: Function signature changed"]));
}
