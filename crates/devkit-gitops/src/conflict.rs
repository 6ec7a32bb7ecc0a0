//! Mechanical resolution of merge conflict markers.
//!
//! A conflict region looks like
//!
//! ```text
//! <<<<<<< HEAD
//! our lines
//! =======
//! their lines
//! >>>>>>> feature
//! ```
//!
//! Resolving keeps one side of every region, with trailing whitespace
//! trimmed and a single newline appended, and leaves the text around the
//! regions untouched.

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use devkit_core::{DevkitError, Result};
use regex::Regex;
use tracing::{debug, info};

use crate::executor::{run_checked, VcsExecutor};
use crate::fs::atomic_write;

static CONFLICT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<<<<<<< [^\n]*\n(.*?)\n=======\n(.*?)>>>>>>> [^\n]*\n")
        .expect("conflict marker regex compiles")
});

/// Which side of a conflict to keep.
///
/// # Examples
///
/// ```
/// use devkit_gitops::conflict::Resolution;
///
/// assert_eq!("ours".parse::<Resolution>().unwrap(), Resolution::Ours);
/// assert!("both".parse::<Resolution>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Keep the block above `=======`.
    Ours,
    /// Keep the block below `=======`.
    Theirs,
}

impl FromStr for Resolution {
    type Err = DevkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ours" => Ok(Resolution::Ours),
            "theirs" => Ok(Resolution::Theirs),
            other => Err(DevkitError::Parse(format!(
                "unknown resolution strategy '{other}', expected 'ours' or 'theirs'"
            ))),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Ours => write!(f, "ours"),
            Resolution::Theirs => write!(f, "theirs"),
        }
    }
}

/// One marker-delimited region found in file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRegion<'a> {
    /// Byte range of the whole region, markers and closing newline included.
    pub span: Range<usize>,
    /// Our block, trailing whitespace trimmed.
    pub ours: &'a str,
    /// Their block, trailing whitespace trimmed.
    pub theirs: &'a str,
}

impl ConflictRegion<'_> {
    fn pick(&self, resolution: Resolution) -> &str {
        match resolution {
            Resolution::Ours => self.ours,
            Resolution::Theirs => self.theirs,
        }
    }
}

/// Locate every conflict region in `content`, in order.
///
/// Markers are matched case-sensitively and each label line must end with
/// a newline, so a region at the very end of a file without one is not found.
pub fn find_regions(content: &str) -> Vec<ConflictRegion<'_>> {
    CONFLICT_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ConflictRegion {
                span: whole.range(),
                ours: caps.get(1)?.as_str().trim_end(),
                theirs: caps.get(2)?.as_str().trim_end(),
            })
        })
        .collect()
}

/// Resolve every region in `content`, returning the new text, or `None`
/// when there is nothing to resolve.
///
/// # Examples
///
/// ```
/// use devkit_gitops::conflict::{resolve_content, Resolution};
///
/// let text = "a\n<<<<<<< HEAD\nmine\n=======\nyours\n>>>>>>> topic\nb\n";
/// assert_eq!(
///     resolve_content(text, Resolution::Theirs).as_deref(),
///     Some("a\nyours\nb\n")
/// );
/// assert_eq!(resolve_content("clean\n", Resolution::Ours), None);
/// ```
pub fn resolve_content(content: &str, resolution: Resolution) -> Option<String> {
    let regions = find_regions(content);
    if regions.is_empty() {
        return None;
    }

    let mut resolved = content.to_string();
    for region in regions.iter().rev() {
        let mut replacement = region.pick(resolution).to_string();
        replacement.push('\n');
        resolved.replace_range(region.span.clone(), &replacement);
    }
    Some(resolved)
}

/// Resolve the conflicts in `path` and stage it, returning how many regions
/// were resolved.
///
/// The file is rewritten once, from a fully built result, before `git add`
/// runs.
///
/// # Errors
///
/// Returns an error when the file cannot be read or written, when it holds
/// no conflict regions, or when staging fails.
pub fn try_resolve_conflict(
    exec: &dyn VcsExecutor,
    path: &Path,
    resolution: Resolution,
) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let count = find_regions(&content).len();
    let resolved = resolve_content(&content, resolution).ok_or_else(|| {
        DevkitError::Parse(format!("no conflict markers in {}", path.display()))
    })?;

    atomic_write(path, &resolved)?;
    let target = path.to_string_lossy();
    run_checked(exec, &["git", "add", "--", &target], None)?;
    info!(path = %path.display(), regions = count, %resolution, "resolved conflicts");
    Ok(count)
}

/// Resolve `path` with the strategy named by `strategy` (`"ours"` or
/// `"theirs"`).
///
/// Returns `false` for an unknown strategy, an unreadable file, a file
/// without conflict markers, or a failed write or stage. An unknown
/// strategy is rejected before the file is touched.
pub fn resolve_conflict(exec: &dyn VcsExecutor, path: &Path, strategy: &str) -> bool {
    let resolution = match strategy.parse::<Resolution>() {
        Ok(resolution) => resolution,
        Err(err) => {
            debug!(%err, "conflict resolution rejected");
            return false;
        }
    };
    match try_resolve_conflict(exec, path, resolution) {
        Ok(_) => true,
        Err(err) => {
            debug!(path = %path.display(), %err, "conflict resolution failed");
            false
        }
    }
}

/// Abort the merge in progress. `true` iff `git merge --abort` succeeds.
pub fn abort_merge(exec: &dyn VcsExecutor) -> bool {
    match run_checked(exec, &["git", "merge", "--abort"], None) {
        Ok(_) => true,
        Err(err) => {
            debug!(%err, "merge abort failed");
            false
        }
    }
}

/// Paths with unresolved conflicts.
///
/// # Errors
///
/// Returns the executor failure or a [`DevkitError::Git`] for a non-zero exit.
pub fn try_find_conflicts(exec: &dyn VcsExecutor) -> Result<Vec<String>> {
    let output = run_checked(exec, &["git", "diff", "--name-only", "--diff-filter=U"], None)?;
    Ok(output
        .stdout
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Paths with unresolved conflicts, empty when git fails.
pub fn find_conflicts(exec: &dyn VcsExecutor) -> Vec<String> {
    try_find_conflicts(exec).unwrap_or_else(|err| {
        debug!(%err, "listing conflicts failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecOutput;
    use crate::testing::ScriptedExecutor;

    const ONE: &str =
        "before\n<<<<<<< HEAD\nour changes\n=======\ntheir changes\n>>>>>>> branch\nafter";

    #[test]
    fn single_region_both_sides() {
        assert_eq!(
            resolve_content(ONE, Resolution::Ours).unwrap(),
            "before\nour changes\nafter"
        );
        assert_eq!(
            resolve_content(ONE, Resolution::Theirs).unwrap(),
            "before\ntheir changes\nafter"
        );
    }

    #[test]
    fn regions_capture_trimmed_blocks() {
        let text = "<<<<<<< HEAD\nx = 1   \n\n=======\nx = 2\t\n>>>>>>> main\n";
        let regions = find_regions(text);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].ours, "x = 1");
        assert_eq!(regions[0].theirs, "x = 2");
        assert_eq!(regions[0].span, 0..text.len());
    }

    #[test]
    fn multiline_blocks_keep_inner_newlines() {
        let text = "<<<<<<< HEAD\na\nb\n=======\nc\n>>>>>>> x\n";
        assert_eq!(resolve_content(text, Resolution::Ours).unwrap(), "a\nb\n");
    }

    #[test]
    fn marker_without_label_space_is_not_a_region() {
        assert!(find_regions("<<<<<<<\na\n=======\nb\n>>>>>>>\n").is_empty());
    }

    #[test]
    fn strategy_parsing_is_exact() {
        assert_eq!("theirs".parse::<Resolution>().unwrap(), Resolution::Theirs);
        assert!("Ours".parse::<Resolution>().is_err());
        assert_eq!(Resolution::Ours.to_string(), "ours");
    }

    #[test]
    fn unknown_strategy_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        std::fs::write(&path, ONE).unwrap();
        let exec = ScriptedExecutor::default();

        assert!(!resolve_conflict(&exec, &path, "invalid"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ONE);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn missing_file_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let exec = ScriptedExecutor::default();
        assert!(!resolve_conflict(&exec, &dir.path().join("gone.txt"), "ours"));
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn stage_failure_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        std::fs::write(&path, ONE).unwrap();
        let exec = ScriptedExecutor::new([ExecOutput::failed(128, "fatal: index.lock exists")]);

        assert!(!resolve_conflict(&exec, &path, "ours"));
        assert_eq!(exec.commands().len(), 1);
    }

    #[test]
    fn dash_leading_path_is_staged_after_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("-n.txt");
        std::fs::write(&path, ONE).unwrap();
        let exec = ScriptedExecutor::default();

        assert!(resolve_conflict(&exec, &path, "theirs"));
        let calls = exec.calls();
        let args = &calls[0].args;
        assert_eq!(args[..3], ["git", "add", "--"]);
        assert!(args[3].ends_with("-n.txt"));
    }

    #[test]
    fn try_variant_reports_region_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.txt");
        std::fs::write(
            &path,
            "<<<<<<< a\n1\n=======\n2\n>>>>>>> b\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\n",
        )
        .unwrap();
        let exec = ScriptedExecutor::default();

        assert_eq!(try_resolve_conflict(&exec, &path, Resolution::Theirs).unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2\n4\n");
    }

    #[test]
    fn abort_merge_reflects_exit_status() {
        let exec = ScriptedExecutor::new([ExecOutput::ok(""), ExecOutput::failed(128, "no merge")]);
        assert!(abort_merge(&exec));
        assert!(!abort_merge(&exec));
        assert_eq!(exec.commands()[0], "git merge --abort");
    }

    #[test]
    fn find_conflicts_drops_blank_lines() {
        let exec = ScriptedExecutor::new([ExecOutput::ok("src/a.rs\n\nsrc/b.rs\n")]);
        assert_eq!(find_conflicts(&exec), vec!["src/a.rs", "src/b.rs"]);
        assert_eq!(exec.commands(), vec!["git diff --name-only --diff-filter=U"]);
    }

    #[test]
    fn find_conflicts_is_empty_on_failure() {
        let exec = ScriptedExecutor::new([ExecOutput::failed(1, "not a repo")]);
        assert!(find_conflicts(&exec).is_empty());
    }
}
