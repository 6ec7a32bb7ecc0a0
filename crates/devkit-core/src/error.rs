use std::path::PathBuf;

/// Errors that can occur across devkit.
///
/// Library crates use this type directly. It implements
/// [`miette::Diagnostic`] so the binary can propagate it with `?`.
///
/// # Examples
///
/// ```
/// use devkit_core::DevkitError;
///
/// let err = DevkitError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum DevkitError {
    /// Filesystem or process-spawn I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(devkit::config))]
    Config(String),

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed ({}): {stderr}", status_label(.status))]
    #[diagnostic(code(devkit::git))]
    Git {
        /// The command line that was run, space-joined.
        command: String,
        /// Exit status, `None` when the process was killed by a signal.
        status: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },

    /// Malformed text input (version strings, porcelain, replies).
    #[error("parse error: {0}")]
    Parse(String),

    /// Caller arguments that no command could act on.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(devkit::llm))]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

fn status_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DevkitError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = DevkitError::Config("bad value".into());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }

    #[test]
    fn git_error_shows_command_and_status() {
        let err = DevkitError::Git {
            command: "git merge feature".into(),
            status: Some(1),
            stderr: "CONFLICT (content)".into(),
        };
        assert_eq!(
            err.to_string(),
            "`git merge feature` failed (exit code 1): CONFLICT (content)"
        );
    }

    #[test]
    fn git_error_without_status() {
        let err = DevkitError::Git {
            command: "git log".into(),
            status: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = DevkitError::FileNotFound(PathBuf::from("/tmp/VERSION"));
        assert!(err.to_string().contains("/tmp/VERSION"));
    }
}
