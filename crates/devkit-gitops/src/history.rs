//! Commit history and message search over `git log`.

use chrono::{DateTime, Utc};
use devkit_core::Result;
use serde::Serialize;
use tracing::debug;

use crate::executor::{run_checked, VcsExecutor};

/// `git log` format consumed by [`parse_log`].
pub const LOG_FORMAT: &str = "--pretty=format:%H|%an|%ae|%at|%s";

/// One commit from a `hash|author|email|epoch|subject` log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Author time.
    pub date: DateTime<Utc>,
    /// Subject line.
    pub message: String,
}

impl CommitRecord {
    /// Parse one log line.
    ///
    /// The subject is the remainder after the fourth `|`, so subjects that
    /// contain pipes survive intact. Returns `None` for lines with fewer than
    /// five fields or a non-integer timestamp.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_gitops::history::CommitRecord;
    ///
    /// let rec = CommitRecord::parse("abc123|Ada|ada@example.com|1700000000|Fix bug").unwrap();
    /// assert_eq!(rec.author, "Ada");
    /// assert_eq!(rec.date.timestamp(), 1_700_000_000);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.splitn(5, '|');
        let hash = fields.next()?;
        let author = fields.next()?;
        let email = fields.next()?;
        let timestamp = fields.next()?;
        let message = fields.next()?;
        let date = DateTime::from_timestamp(timestamp.trim().parse().ok()?, 0)?;
        Some(Self {
            hash: hash.to_string(),
            author: author.to_string(),
            email: email.to_string(),
            date,
            message: message.to_string(),
        })
    }

    /// First seven characters of the hash.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Parse every non-empty line of [`LOG_FORMAT`] output.
pub fn parse_log(output: &str) -> Vec<CommitRecord> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let record = CommitRecord::parse(line);
            if record.is_none() {
                debug!(line, "skipping malformed log line");
            }
            record
        })
        .collect()
}

/// Commits touching `path`, following renames, newest first.
///
/// # Errors
///
/// Returns the executor failure or a [`devkit_core::DevkitError::Git`].
pub fn try_file_history(exec: &dyn VcsExecutor, path: &str) -> Result<Vec<CommitRecord>> {
    let output = run_checked(exec, &["git", "log", "--follow", LOG_FORMAT, "--", path], None)?;
    Ok(parse_log(&output.stdout))
}

/// Commits touching `path`, empty when git fails.
pub fn file_history(exec: &dyn VcsExecutor, path: &str) -> Vec<CommitRecord> {
    try_file_history(exec, path).unwrap_or_else(|err| {
        debug!(path, %err, "file history failed");
        Vec::new()
    })
}

/// Commits on any ref whose message matches `query`.
///
/// # Errors
///
/// Returns the executor failure or a [`devkit_core::DevkitError::Git`].
pub fn try_find_commit(exec: &dyn VcsExecutor, query: &str) -> Result<Vec<CommitRecord>> {
    let output = run_checked(exec, &["git", "log", "--all", "--grep", query, LOG_FORMAT], None)?;
    Ok(parse_log(&output.stdout))
}

/// Commits whose message matches `query`, empty when git fails.
pub fn find_commit(exec: &dyn VcsExecutor, query: &str) -> Vec<CommitRecord> {
    try_find_commit(exec, query).unwrap_or_else(|err| {
        debug!(query, %err, "commit search failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecOutput;
    use crate::testing::ScriptedExecutor;

    #[test]
    fn fields_are_taken_verbatim() {
        let line = "0123abcd|Grace Hopper|grace@navy.mil|1609459200|Fix compiler bug";
        let rec = CommitRecord::parse(line).unwrap();
        assert_eq!(rec.hash, "0123abcd");
        assert_eq!(rec.author, "Grace Hopper");
        assert_eq!(rec.email, "grace@navy.mil");
        assert_eq!(rec.message, "Fix compiler bug");
        assert_eq!(rec.date, DateTime::from_timestamp(1_609_459_200, 0).unwrap());
        assert_eq!(rec.short_hash(), "0123abc");
    }

    #[test]
    fn pipes_in_subject_are_kept() {
        let rec = CommitRecord::parse("h|a|e|0|feat: a | b").unwrap();
        assert_eq!(rec.message, "feat: a | b");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert!(CommitRecord::parse("h|a|e|0").is_none());
        assert!(CommitRecord::parse("h|a|e|yesterday|msg").is_none());
        let out = "h1|a|e|10|one\n\nbroken\nh2|b|f|20|two\n";
        let records = parse_log(out);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].hash, "h2");
    }

    #[test]
    fn file_history_runs_follow_log() {
        let exec = ScriptedExecutor::new([ExecOutput::ok("h|a|e|1|init")]);
        let records = file_history(&exec, "src/lib.rs");
        assert_eq!(records.len(), 1);
        assert_eq!(
            exec.commands(),
            vec!["git log --follow --pretty=format:%H|%an|%ae|%at|%s -- src/lib.rs"]
        );
    }

    #[test]
    fn failures_collapse_to_empty() {
        let exec = ScriptedExecutor::new([
            ExecOutput::failed(128, "fatal: bad revision"),
            ExecOutput::failed(128, "fatal: not a git repository"),
        ]);
        assert!(file_history(&exec, "x").is_empty());
        assert!(find_commit(&exec, "bug").is_empty());
    }

    #[test]
    fn find_commit_returns_only_what_git_matched() {
        let exec = ScriptedExecutor::new([
            ExecOutput::ok(""),
            ExecOutput::ok("abc|Dev|dev@x.io|1700000000|fix: bug in parser\n"),
        ]);
        assert!(find_commit(&exec, "bug").is_empty());

        let found = find_commit(&exec, "bug");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "fix: bug in parser");
        assert_eq!(
            exec.calls()[1].args,
            vec!["git", "log", "--all", "--grep", "bug", LOG_FORMAT]
        );
    }

    #[test]
    fn serializes_date_as_rfc3339() {
        let rec = CommitRecord::parse("h|a|e|0|m").unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["date"], "1970-01-01T00:00:00Z");
    }
}
