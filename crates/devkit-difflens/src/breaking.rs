use crate::line::{lines, DiffLineKind, UNKNOWN_FILE};
use crate::patterns::BREAKING_PATTERNS;

/// Flag likely API breakage in a diff.
///
/// Both added and removed lines are scanned. Returns `"<file>: <message>"`
/// once per distinct pair, in order of first occurrence.
///
/// # Examples
///
/// ```
/// use devkit_difflens::detect_breaking_changes;
///
/// let diff = "diff --git a/api.py b/api.py\n\
///             -def fetch(url):\n\
///             +def fetch(url, timeout):\n";
/// assert_eq!(
///     detect_breaking_changes(diff),
///     vec!["api.py: Function signature changed"]
/// );
/// ```
pub fn detect_breaking_changes(diff: &str) -> Vec<String> {
    let mut findings: Vec<String> = Vec::new();
    let mut current_file: Option<String> = None;

    for line in lines(diff) {
        match line.kind {
            DiffLineKind::FileHeader => current_file = line.header_path(),
            DiffLineKind::Addition | DiffLineKind::Deletion => {
                let file = current_file.as_deref().unwrap_or(UNKNOWN_FILE);
                for pattern in BREAKING_PATTERNS.iter() {
                    if pattern.is_match(line.text) {
                        let finding = format!("{file}: {}", pattern.label);
                        if !findings.contains(&finding) {
                            findings.push(finding);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    findings
}
