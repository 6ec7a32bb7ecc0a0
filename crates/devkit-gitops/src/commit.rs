//! Commits and the staging area.

use devkit_core::{DevkitError, Result};
use tracing::info;

use crate::executor::{run_checked, VcsExecutor};

/// Placeholder commit message derived from a diff.
///
/// Counts `+++` new-file markers; an empty diff gives `"Empty commit"`.
///
/// # Examples
///
/// ```
/// use devkit_gitops::commit::smart_commit_message;
///
/// assert_eq!(smart_commit_message(""), "Empty commit");
/// assert_eq!(
///     smart_commit_message("--- a/x\n+++ b/x\n--- a/y\n+++ b/y\n"),
///     "Update 2 files"
/// );
/// ```
pub fn smart_commit_message(diff: &str) -> String {
    if diff.is_empty() {
        return "Empty commit".into();
    }
    let files = diff.lines().filter(|l| l.starts_with("+++")).count();
    format!("Update {files} files")
}

/// Stage `files` (when any) and commit with `message`.
///
/// # Errors
///
/// Returns [`DevkitError::Git`] when staging or committing fails, including
/// when there is nothing to commit.
pub fn commit_changes(exec: &dyn VcsExecutor, message: &str, files: &[String]) -> Result<()> {
    if !files.is_empty() {
        git_with_paths(exec, &["git", "add"], files)?;
    }
    run_checked(exec, &["git", "commit", "-m", message], None)?;
    info!(files = files.len(), "committed");
    Ok(())
}

/// Amend the last commit, replacing its message or keeping it.
///
/// # Errors
///
/// Returns [`DevkitError::Git`] when git refuses, e.g. on an unborn branch.
pub fn amend_commit(exec: &dyn VcsExecutor, message: Option<&str>) -> Result<()> {
    let mut args = vec!["git", "commit", "--amend"];
    match message {
        Some(message) => args.extend(["-m", message]),
        None => args.push("--no-edit"),
    }
    run_checked(exec, &args, None)?;
    info!(new_message = message.is_some(), "amended last commit");
    Ok(())
}

/// Add `files` to the index.
///
/// # Errors
///
/// Returns [`DevkitError::InvalidInput`] for an empty list without running
/// git, or [`DevkitError::Git`] when `git add` fails.
pub fn stage_files(exec: &dyn VcsExecutor, files: &[String]) -> Result<()> {
    require_paths(files)?;
    git_with_paths(exec, &["git", "add"], files)?;
    info!(files = files.len(), "staged");
    Ok(())
}

/// Remove `files` from the index, leaving the working tree alone.
///
/// # Errors
///
/// Returns [`DevkitError::InvalidInput`] for an empty list without running
/// git, or [`DevkitError::Git`] when `git reset` fails.
pub fn unstage_files(exec: &dyn VcsExecutor, files: &[String]) -> Result<()> {
    require_paths(files)?;
    git_with_paths(exec, &["git", "reset", "HEAD"], files)?;
    info!(files = files.len(), "unstaged");
    Ok(())
}

/// Stage individual hunks by applying them to the index.
///
/// The hunks are joined with newlines and fed to
/// `git apply --cached --unidiff-zero`, so each must carry the file headers
/// git needs to place it.
///
/// # Errors
///
/// Returns [`DevkitError::Git`] when git rejects the patch.
pub fn stage_hunks(exec: &dyn VcsExecutor, hunks: &[String]) -> Result<()> {
    let patch = hunks.join("\n");
    run_checked(
        exec,
        &["git", "apply", "--cached", "--unidiff-zero"],
        Some(patch.as_str()),
    )?;
    info!(hunks = hunks.len(), "staged hunks");
    Ok(())
}

fn require_paths(files: &[String]) -> Result<()> {
    if files.is_empty() {
        return Err(DevkitError::InvalidInput("no files given".into()));
    }
    Ok(())
}

fn git_with_paths(exec: &dyn VcsExecutor, base: &[&str], files: &[String]) -> Result<()> {
    let mut args = base.to_vec();
    args.push("--");
    args.extend(files.iter().map(String::as_str));
    run_checked(exec, &args, None)?;
    Ok(())
}
