//! Impact classification: what a diff touches and what it leaves untested.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::line::{lines, DiffLineKind, UNKNOWN_FILE};
use crate::patterns::API_PATTERNS;

/// Dependency manifests whose added/removed lines are tracked.
const MANIFESTS: [&str; 2] = ["requirements.txt", "package.json"];

/// Path fragments that mark a file as a test.
const TEST_MARKERS: [&str; 3] = ["test", "spec", "_test"];

/// Scope, dependency deltas, API touches and coverage gaps of a diff.
///
/// # Examples
///
/// ```
/// use devkit_difflens::impact::{impact_analysis, ImpactAnalysis};
///
/// assert_eq!(impact_analysis(""), ImpactAnalysis::default());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    /// Files and directories touched.
    pub scope: Scope,
    /// Package specifiers added to or removed from manifests.
    pub dependencies: DependencyChanges,
    /// `"<file>: <line>"` for every API-pattern match, in diff order.
    pub api_changes: Vec<String>,
    /// Test files touched and source files changed without tests.
    pub test_coverage: TestCoverage,
}

/// Files and parent directories touched by a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scope {
    /// Files in header order.
    pub files: Vec<String>,
    /// Distinct parent directories, sorted.
    pub directories: Vec<String>,
}

/// Manifest lines that look like package specifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyChanges {
    /// Trimmed bodies of added specifier lines.
    pub added: Vec<String>,
    /// Trimmed bodies of removed specifier lines.
    pub removed: Vec<String>,
}

/// Test-related files in a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCoverage {
    /// Headers whose path contains "test" (case-insensitive).
    pub modified_tests: Vec<String>,
    /// Non-test files with added lines, each listed once.
    pub needs_tests: Vec<String>,
}

/// Classify the impact of `diff`.
///
/// Every line is checked against the API patterns, including headers and
/// file markers, and repeated matches are all recorded. Manifest and
/// coverage checks only apply once a file header has been seen.
pub fn impact_analysis(diff: &str) -> ImpactAnalysis {
    let mut impact = ImpactAnalysis::default();
    let mut directories: BTreeSet<String> = BTreeSet::new();
    let mut current_file: Option<String> = None;

    for line in lines(diff) {
        if let Some(path) = line.header_path() {
            impact.scope.files.push(path.clone());
            directories.insert(parent_dir(&path));
            if path.to_lowercase().contains("test") {
                impact.test_coverage.modified_tests.push(path.clone());
            }
            current_file = Some(path);
        }

        if let Some(file) = current_file.as_deref() {
            if is_manifest(file) && is_specifier(line.text) {
                match line.kind {
                    DiffLineKind::Addition => {
                        impact.dependencies.added.push(line.body().trim().to_string())
                    }
                    DiffLineKind::Deletion => {
                        impact.dependencies.removed.push(line.body().trim().to_string())
                    }
                    _ => {}
                }
            }

            if line.kind == DiffLineKind::Addition
                && !is_test_path(file)
                && !impact.test_coverage.needs_tests.iter().any(|f| f == file)
            {
                impact.test_coverage.needs_tests.push(file.to_string());
            }
        }

        let file = current_file.as_deref().unwrap_or(UNKNOWN_FILE);
        for pattern in API_PATTERNS.iter() {
            if pattern.is_match(line.text) {
                impact
                    .api_changes
                    .push(format!("{file}: {}", line.text.trim()));
            }
        }
    }

    impact.scope.directories = directories.into_iter().collect();
    impact
}

fn is_manifest(file: &str) -> bool {
    MANIFESTS.iter().any(|m| file.contains(m))
}

fn is_specifier(line: &str) -> bool {
    line.contains("==") || line.contains('@')
}

fn is_test_path(file: &str) -> bool {
    TEST_MARKERS.iter().any(|m| file.contains(m))
}

fn parent_dir(file: &str) -> String {
    match file.rsplit_once('/') {
        Some(("", _)) => "/".into(),
        Some((dir, _)) => dir.into(),
        None => ".".into(),
    }
}

impl fmt::Display for ImpactAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Impact Analysis")?;
        writeln!(f, "===============")?;
        writeln!(
            f,
            "{} files in {} directories",
            self.scope.files.len(),
            self.scope.directories.len()
        )?;
        for file in &self.scope.files {
            writeln!(f, "  {file}")?;
        }

        let sections: [(&str, &[String]); 5] = [
            ("Dependencies added", &self.dependencies.added),
            ("Dependencies removed", &self.dependencies.removed),
            ("API changes", &self.api_changes),
            ("Modified tests", &self.test_coverage.modified_tests),
            ("Needs tests", &self.test_coverage.needs_tests),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            writeln!(f, "\n{title}:")?;
            for item in items {
                writeln!(f, "  {item}")?;
            }
        }
        Ok(())
    }
}

impl ImpactAnalysis {
    /// Render the analysis as a markdown string.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Impact Analysis\n\n");
        out.push_str(&format!(
            "**{} files** in {} directories\n\n",
            self.scope.files.len(),
            self.scope.directories.len()
        ));
        let sections: [(&str, &[String]); 6] = [
            ("Files", &self.scope.files),
            ("Dependencies added", &self.dependencies.added),
            ("Dependencies removed", &self.dependencies.removed),
            ("API changes", &self.api_changes),
            ("Modified tests", &self.test_coverage.modified_tests),
            ("Needs tests", &self.test_coverage.needs_tests),
        ];
        for (title, items) in sections {
            if items.is_empty() {
                continue;
            }
            out.push_str(&format!("## {title}\n\n"));
            for item in items {
                out.push_str(&format!("- `{item}`\n"));
            }
            out.push('\n');
        }
        out
    }
}
