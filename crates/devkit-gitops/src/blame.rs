//! Line attribution from `git blame --porcelain`.

use chrono::{DateTime, Utc};
use devkit_core::Result;
use serde::Serialize;
use tracing::debug;

use crate::executor::{run_checked, VcsExecutor};

/// One attributed line of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameEntry {
    /// Commit that last touched the line.
    pub hash: String,
    /// 1-based position of this entry in the parsed output.
    pub line_number: usize,
    pub author: Option<String>,
    /// Author email as printed by git, angle brackets included.
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
    /// Commit subject.
    pub summary: Option<String>,
    /// Line content without the leading tab.
    pub code: Option<String>,
}

/// Parse `git blame --porcelain` output.
///
/// A line starting with a lowercase hex digit and holding at least four
/// whitespace-separated tokens opens a new entry. `author `, `author-mail `,
/// `author-time ` and `summary ` lines fill in the open entry. A
/// tab-prefixed line supplies its code and closes it; an entry that never
/// gets a code line is dropped, and code lines with no open entry are
/// ignored.
///
/// `line_number` is the count of entries kept so far plus one, taken when
/// the entry opens. It is an output position, not the line number git
/// reports.
///
/// # Examples
///
/// ```
/// use devkit_gitops::blame::parse_porcelain;
///
/// let out = "d4e5f6a7 1 1 1\nauthor Ada\nsummary init\n\tfn main() {}\n";
/// let entries = parse_porcelain(out);
/// assert_eq!(entries.len(), 1);
/// assert_eq!(entries[0].code.as_deref(), Some("fn main() {}"));
/// ```
pub fn parse_porcelain(output: &str) -> Vec<BlameEntry> {
    let mut entries: Vec<BlameEntry> = Vec::new();
    let mut pending: Option<BlameEntry> = None;

    for line in output.lines() {
        if is_boundary(line) {
            pending = Some(BlameEntry {
                hash: line.split_whitespace().next().unwrap_or_default().to_string(),
                line_number: entries.len() + 1,
                ..BlameEntry::default()
            });
            continue;
        }

        let Some(entry) = pending.as_mut() else {
            continue;
        };
        if let Some(author) = line.strip_prefix("author ") {
            entry.author = Some(author.to_string());
        } else if let Some(mail) = line.strip_prefix("author-mail ") {
            entry.email = Some(mail.to_string());
        } else if let Some(time) = line.strip_prefix("author-time ") {
            entry.date = time
                .trim()
                .parse()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0));
        } else if let Some(summary) = line.strip_prefix("summary ") {
            entry.summary = Some(summary.to_string());
        } else if let Some(code) = line.strip_prefix('\t') {
            entry.code = Some(code.to_string());
            entries.extend(pending.take());
        }
    }

    entries
}

fn is_boundary(line: &str) -> bool {
    line.starts_with(|c: char| matches!(c, '0'..='9' | 'a'..='f'))
        && line.split_whitespace().count() >= 4
}

/// Blame `path`.
///
/// # Errors
///
/// Returns the executor failure or a [`devkit_core::DevkitError::Git`].
pub fn try_blame(exec: &dyn VcsExecutor, path: &str) -> Result<Vec<BlameEntry>> {
    let output = run_checked(exec, &["git", "blame", "--porcelain", path], None)?;
    Ok(parse_porcelain(&output.stdout))
}

/// Blame `path`, empty when git fails.
pub fn blame(exec: &dyn VcsExecutor, path: &str) -> Vec<BlameEntry> {
    try_blame(exec, path).unwrap_or_else(|err| {
        debug!(path, %err, "blame failed");
        Vec::new()
    })
}
