//! Branch management.

use devkit_core::Result;
use tracing::info;

use crate::executor::{run_checked, VcsExecutor};

/// Create `name` from `base` (or `HEAD`) and check it out.
///
/// # Errors
///
/// Returns [`devkit_core::DevkitError::Git`] when checkout fails, e.g. the
/// branch already exists.
pub fn create_branch(exec: &dyn VcsExecutor, name: &str, base: Option<&str>) -> Result<()> {
    let mut args = vec!["git", "checkout", "-b", name];
    args.extend(base);
    run_checked(exec, &args, None)?;
    info!(branch = name, base = base.unwrap_or("HEAD"), "created branch");
    Ok(())
}

/// Check out an existing branch.
///
/// # Errors
///
/// Returns [`devkit_core::DevkitError::Git`] when checkout fails.
pub fn switch_branch(exec: &dyn VcsExecutor, name: &str) -> Result<()> {
    run_checked(exec, &["git", "checkout", name], None)?;
    info!(branch = name, "switched branch");
    Ok(())
}

/// Merge `source` into `target`, or into the current branch when no target
/// is given. Returns git's merge summary.
///
/// # Errors
///
/// Returns [`devkit_core::DevkitError::Git`] carrying git's stderr when the
/// checkout or the merge fails.
pub fn merge_branch(exec: &dyn VcsExecutor, source: &str, target: Option<&str>) -> Result<String> {
    if let Some(target) = target {
        run_checked(exec, &["git", "checkout", target], None)?;
    }
    let output = run_checked(exec, &["git", "merge", source], None)?;
    info!(source, target = target.unwrap_or("HEAD"), "merged branch");
    Ok(output.stdout)
}

/// Local branch names, or remote-tracking ones when `remote` is set.
///
/// The current-branch marker and padding are stripped.
///
/// # Errors
///
/// Returns [`devkit_core::DevkitError::Git`] outside a repository.
pub fn list_branches(exec: &dyn VcsExecutor, remote: bool) -> Result<Vec<String>> {
    let mut args = vec!["git", "branch"];
    if remote {
        args.push("-r");
    }
    let output = run_checked(exec, &args, None)?;
    Ok(output
        .stdout
        .lines()
        .map(|line| line.trim_matches(|c| c == '*' || c == ' '))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Delete a branch; `force` deletes it even when unmerged.
///
/// # Errors
///
/// Returns [`devkit_core::DevkitError::Git`] when git refuses.
pub fn delete_branch(exec: &dyn VcsExecutor, name: &str, force: bool) -> Result<()> {
    let flag = if force { "-D" } else { "-d" };
    run_checked(exec, &["git", "branch", flag, name], None)?;
    info!(branch = name, force, "deleted branch");
    Ok(())
}
