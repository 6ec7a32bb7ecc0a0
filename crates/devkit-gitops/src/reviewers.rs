use std::collections::BTreeSet;

use devkit_difflens::line::lines;
use tracing::debug;

use crate::executor::{run_checked, VcsExecutor};

/// Suggest reviewers for a diff: everyone who authored a line of a touched file.
///
/// Each file header in `diff` is blamed in turn. Files that cannot be blamed,
/// such as ones the diff adds, contribute nobody. Names come back sorted and
/// deduplicated.
pub fn suggest_reviewers(exec: &dyn VcsExecutor, diff: &str) -> Vec<String> {
    let mut authors = BTreeSet::new();
    for file in lines(diff).filter_map(|line| line.header_path()) {
        match run_checked(exec, &["git", "blame", "--porcelain", &file], None) {
            Ok(output) => authors.extend(
                output
                    .stdout
                    .lines()
                    .filter_map(|l| l.strip_prefix("author "))
                    .map(str::to_string),
            ),
            Err(err) => debug!(file = %file, %err, "skipping file for reviewers"),
        }
    }
    authors.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecOutput;
    use crate::testing::ScriptedExecutor;

    const DIFF: &str = "\
diff --git a/src/auth.py b/src/auth.py
+token = issue()
diff --git a/src/new.py b/src/new.py
+print('new')
diff --git a/README.md b/README.md
+docs
";

    #[test]
    fn authors_are_sorted_and_unique() {
        let exec = ScriptedExecutor::new([
            ExecOutput::ok("abc 1 1 1\nauthor Zoe\nauthor-mail <z@x>\n\tx\ndef 2 2 1\nauthor Ali\n\ty\n"),
            ExecOutput::failed(128, "fatal: no such path 'src/new.py' in HEAD"),
            ExecOutput::ok("abc 1 1 1\nauthor Zoe\n\tz\n"),
        ]);
        assert_eq!(suggest_reviewers(&exec, DIFF), vec!["Ali", "Zoe"]);
        assert_eq!(
            exec.commands(),
            vec![
                "git blame --porcelain src/auth.py",
                "git blame --porcelain src/new.py",
                "git blame --porcelain README.md",
            ]
        );
    }

    #[test]
    fn no_headers_runs_nothing() {
        let exec = ScriptedExecutor::default();
        assert!(suggest_reviewers(&exec, "+stray\n").is_empty());
        assert!(exec.calls().is_empty());
    }
}
