use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::line::{lines, DiffLineKind, UNKNOWN_FILE};
use crate::patterns::RISKY_PATTERNS;

/// Changed-line count above which [`analyze`] flags a diff as high impact.
pub const HIGH_IMPACT_THRESHOLD: usize = 100;

/// Change statistics and risk signals for a whole diff.
///
/// # Examples
///
/// ```
/// use devkit_difflens::analysis::analyze;
///
/// let diff = "diff --git a/app.js b/app.js\n\
///             --- a/app.js\n\
///             +++ b/app.js\n\
///             @@ -1 +1,2 @@\n\
///              init();\n\
///             +console.log(state);\n";
/// let report = analyze(diff);
/// assert_eq!(report.files_changed, 1);
/// assert_eq!(report.insertions, 1);
/// assert_eq!(report.risky_patterns, vec!["app.js: console.log"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAnalysis {
    /// Number of `diff --git` headers.
    pub files_changed: usize,
    /// Added content lines, `+++` markers excluded.
    pub insertions: usize,
    /// Removed content lines, `---` markers excluded.
    pub deletions: usize,
    /// Extension (with leading dot, empty for none) to header count.
    pub file_types: BTreeMap<String, usize>,
    /// Files flagged for a large change volume.
    pub high_impact_files: Vec<String>,
    /// Deduplicated `"<file>: <pattern>"` findings on added lines.
    pub risky_patterns: Vec<String>,
}

impl ChangeAnalysis {
    /// Total changed lines.
    pub fn changed_lines(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// Analyze `diff` with the default [`HIGH_IMPACT_THRESHOLD`].
pub fn analyze(diff: &str) -> ChangeAnalysis {
    analyze_with_threshold(diff, HIGH_IMPACT_THRESHOLD)
}

/// Analyze `diff`, flagging high impact when insertions plus deletions exceed `threshold`.
///
/// The threshold is checked once, after the whole diff has been read, and the
/// flag goes to the last file header seen. In a multi-file diff that is not
/// necessarily the file carrying most of the change.
///
/// Structurally odd input never fails; text without any diff lines yields the
/// all-zero [`ChangeAnalysis::default`].
pub fn analyze_with_threshold(diff: &str, threshold: usize) -> ChangeAnalysis {
    let mut analysis = ChangeAnalysis::default();
    let mut current_file: Option<String> = None;

    for line in lines(diff) {
        match line.kind {
            DiffLineKind::FileHeader => {
                let path = line.header_path().unwrap_or_default();
                analysis.files_changed += 1;
                *analysis.file_types.entry(extension_key(&path)).or_insert(0) += 1;
                current_file = Some(path);
            }
            DiffLineKind::Addition => {
                analysis.insertions += 1;
                let file = current_file.as_deref().unwrap_or(UNKNOWN_FILE);
                for pattern in RISKY_PATTERNS.iter() {
                    if pattern.is_match(line.body()) {
                        let finding = format!("{file}: {}", pattern.label);
                        if !analysis.risky_patterns.contains(&finding) {
                            analysis.risky_patterns.push(finding);
                        }
                    }
                }
            }
            DiffLineKind::Deletion => analysis.deletions += 1,
            _ => {}
        }
    }

    if analysis.changed_lines() > threshold {
        if let Some(file) = current_file {
            analysis.high_impact_files.push(file);
        }
    }

    analysis
}

fn extension_key(path: &str) -> String {
    Path::new(path)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

impl fmt::Display for ChangeAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Change Analysis")?;
        writeln!(f, "===============")?;
        writeln!(
            f,
            "{} files changed, +{} insertions, -{} deletions\n",
            self.files_changed, self.insertions, self.deletions
        )?;

        if !self.file_types.is_empty() {
            writeln!(f, "{:<16} {:>6}", "Extension", "Files")?;
            writeln!(f, "{}", "-".repeat(23))?;
            for (ext, count) in &self.file_types {
                let label = if ext.is_empty() { "(none)" } else { ext };
                writeln!(f, "{label:<16} {count:>6}")?;
            }
            writeln!(f)?;
        }

        if !self.high_impact_files.is_empty() {
            writeln!(f, "High impact:")?;
            for file in &self.high_impact_files {
                writeln!(f, "  {file}")?;
            }
        }

        if !self.risky_patterns.is_empty() {
            writeln!(f, "Risky patterns:")?;
            for finding in &self.risky_patterns {
                writeln!(f, "  {finding}")?;
            }
        }
        Ok(())
    }
}

impl ChangeAnalysis {
    /// Render the analysis as a markdown string.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_difflens::analysis::analyze;
    ///
    /// let md = analyze("").to_markdown();
    /// assert!(md.contains("# Change Analysis"));
    /// ```
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Change Analysis\n\n");
        out.push_str(&format!(
            "**{} files** changed, +{} / -{}\n\n",
            self.files_changed, self.insertions, self.deletions
        ));

        if !self.file_types.is_empty() {
            out.push_str("| Extension | Files |\n");
            out.push_str("|-----------|-------|\n");
            for (ext, count) in &self.file_types {
                let label = if ext.is_empty() { "(none)" } else { ext };
                out.push_str(&format!("| `{label}` | {count} |\n"));
            }
            out.push('\n');
        }

        if !self.high_impact_files.is_empty() {
            out.push_str("## High impact\n\n");
            for file in &self.high_impact_files {
                out.push_str(&format!("- `{file}`\n"));
            }
            out.push('\n');
        }

        if !self.risky_patterns.is_empty() {
            out.push_str("## Risky patterns\n\n");
            for finding in &self.risky_patterns {
                out.push_str(&format!("- {finding}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILES: &str = "\
diff --git a/src/calc.py b/src/calc.py
--- a/src/calc.py
+++ b/src/calc.py
@@ -1,3 +1,3 @@
 def add(a, b):
-    return a+b
+    print(a, b)  # TODO remove
diff --git a/web/app.js b/web/app.js
--- a/web/app.js
+++ b/web/app.js
@@ -1,2 +1,4 @@
 start();
+console.log('boot');
+debugger;
+render();
";

    #[test]
    fn empty_diff_is_all_zero() {
        let report = analyze("");
        assert_eq!(report, ChangeAnalysis::default());
        assert_eq!(report.files_changed, 0);
        assert!(report.file_types.is_empty());
        assert!(report.high_impact_files.is_empty());
        assert!(report.risky_patterns.is_empty());
    }

    #[test]
    fn counts_and_risky_patterns() {
        let report = analyze(TWO_FILES);
        assert_eq!(report.files_changed, 2);
        assert_eq!(report.insertions, 4);
        assert_eq!(report.deletions, 1);
        assert_eq!(
            report.file_types,
            BTreeMap::from([(".py".to_string(), 1), (".js".to_string(), 1)])
        );
        assert_eq!(
            report.risky_patterns,
            vec![
                "src/calc.py: TODO",
                "src/calc.py: print(",
                "web/app.js: console.log",
                "web/app.js: debugger",
            ]
        );
    }

    #[test]
    fn two_headers_with_one_line_of_each_kind() {
        let diff = "\
diff --git a/a.rs b/a.rs
-old
 same
+new
diff --git a/b.rs b/b.rs
-old
 same
+new
";
        let report = analyze(diff);
        assert_eq!(report.files_changed, 2);
        assert_eq!(report.insertions, 2);
        assert_eq!(report.deletions, 2);
    }

    #[test]
    fn file_markers_are_not_counted() {
        let diff = "diff --git a/f.rs b/f.rs\n--- a/f.rs\n+++ b/f.rs\n@@ -1 +1 @@\n-a\n+b\n";
        let report = analyze(diff);
        assert_eq!((report.insertions, report.deletions), (1, 1));
    }

    #[test]
    fn risky_findings_are_deduplicated_per_file() {
        let diff = "diff --git a/f.py b/f.py\n+# TODO one\n+# TODO two\n";
        assert_eq!(analyze(diff).risky_patterns, vec!["f.py: TODO"]);
    }

    #[test]
    fn deleted_risky_lines_are_ignored() {
        let diff = "diff --git a/f.py b/f.py\n-print(x)\n -print(y)\n";
        assert!(analyze(diff).risky_patterns.is_empty());
    }

    #[test]
    fn risky_scan_skips_the_plus_prefix() {
        // The `+` itself must not be part of the scanned text.
        let diff = "diff --git a/f b/f\n+TODO\n";
        assert_eq!(analyze(diff).risky_patterns, vec!["f: TODO"]);
    }

    #[test]
    fn high_impact_single_file() {
        let mut diff = String::from("diff --git a/large_file.py b/large_file.py\n");
        for _ in 0..101 {
            diff.push_str("+ new line\n");
        }
        let report = analyze(&diff);
        assert_eq!(report.high_impact_files, vec!["large_file.py"]);
    }

    #[test]
    fn exactly_threshold_is_not_high_impact() {
        let mut diff = String::from("diff --git a/f.py b/f.py\n");
        for _ in 0..100 {
            diff.push_str("+x\n");
        }
        assert!(analyze(&diff).high_impact_files.is_empty());
    }

    #[test]
    fn high_impact_goes_to_last_header_seen() {
        // Known quirk: the threshold is checked once over the whole diff and
        // attributed to the final file, even though big.py carries the change.
        let mut diff = String::from("diff --git a/big.py b/big.py\n");
        for _ in 0..150 {
            diff.push_str("+x\n");
        }
        diff.push_str("diff --git a/tiny.py b/tiny.py\n+y\n");
        let report = analyze(&diff);
        assert_eq!(report.high_impact_files, vec!["tiny.py"]);
    }

    #[test]
    fn custom_threshold() {
        let diff = "diff --git a/f.rs b/f.rs\n+a\n+b\n+c\n";
        assert_eq!(analyze_with_threshold(diff, 2).high_impact_files, vec!["f.rs"]);
        assert!(analyze_with_threshold(diff, 3).high_impact_files.is_empty());
    }

    #[test]
    fn extension_keys() {
        assert_eq!(extension_key("src/lib.rs"), ".rs");
        assert_eq!(extension_key("dist/app.tar.gz"), ".gz");
        assert_eq!(extension_key("Makefile"), "");
        assert_eq!(extension_key(".bashrc"), "");
    }

    #[test]
    fn lines_before_any_header() {
        let report = analyze("+TODO: stray\n");
        assert_eq!(report.files_changed, 0);
        assert_eq!(report.insertions, 1);
        assert_eq!(report.risky_patterns, vec!["(unknown): TODO"]);
    }

    #[test]
    fn json_uses_camel_case() {
        let json = serde_json::to_value(analyze(TWO_FILES)).unwrap();
        assert_eq!(json["filesChanged"], 2);
        assert_eq!(json["fileTypes"][".js"], 1);
        assert!(json["highImpactFiles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn display_and_markdown_output() {
        let report = analyze(TWO_FILES);
        let text = format!("{report}");
        assert!(text.contains("2 files changed, +4 insertions, -1 deletions"));
        assert!(text.contains("web/app.js: debugger"));

        let md = report.to_markdown();
        assert!(md.contains("| `.py` | 1 |"));
        assert!(md.contains("## Risky patterns"));
    }
}
