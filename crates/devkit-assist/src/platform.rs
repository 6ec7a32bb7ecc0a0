//! Host operating system description for prompts.

use std::process::Command;

/// Human-readable name of the running OS, e.g. `"macOS 14.5"` or
/// `"Ubuntu 22.04.4 LTS"`.
///
/// On Linux this is `PRETTY_NAME` from `/etc/os-release`, falling back to
/// `"Linux"`. Other platforms report their target OS name.
pub fn operating_system() -> String {
    match std::env::consts::OS {
        "macos" => match macos_version() {
            Some(version) => format!("macOS {version}"),
            None => "macOS".into(),
        },
        "linux" => std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|contents| pretty_name(&contents))
            .unwrap_or_else(|| "Linux".into()),
        "windows" => "Windows".into(),
        other => other.into(),
    }
}

fn macos_version() -> Option<String> {
    let output = Command::new("sw_vers").arg("-productVersion").output().ok()?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !version.is_empty()).then_some(version)
}

/// `PRETTY_NAME` from os-release contents, quotes removed.
pub fn pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
