//! Ordered detection tables shared by the analyzers.
//!
//! Each table is a list of `(regex, label)` pairs evaluated top to bottom.
//! Callers that deduplicate findings rely on this order being stable.

use std::sync::LazyLock;

use regex::Regex;

/// A compiled pattern and the label reported when it matches.
#[derive(Debug)]
pub struct LabeledPattern {
    /// Compiled expression, searched anywhere in the line.
    pub regex: Regex,
    /// Human-readable label for findings.
    pub label: &'static str,
}

impl LabeledPattern {
    /// Whether the pattern occurs anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn compile(table: &[(&str, &'static str)]) -> Vec<LabeledPattern> {
    table
        .iter()
        .map(|(pattern, label)| LabeledPattern {
            regex: Regex::new(pattern).expect("built-in pattern must compile"),
            label,
        })
        .collect()
}

/// Markers in added code that usually should not be merged.
pub static RISKY_PATTERNS: LazyLock<Vec<LabeledPattern>> = LazyLock::new(|| {
    compile(&[
        (r"TODO", "TODO"),
        (r"FIXME", "FIXME"),
        (r"console\.log", "console.log"),
        (r"print\(", "print("),
        (r"debugger", "debugger"),
    ])
});

/// Declarations that form a public API surface.
pub static API_PATTERNS: LazyLock<Vec<LabeledPattern>> = LazyLock::new(|| {
    compile(&[
        (r"@api", "API annotation"),
        (r"def \w+\(", "function definition"),
        (r"class \w+", "class declaration"),
        (r"interface \w+", "interface declaration"),
        (r"function \w+\(", "function declaration"),
    ])
});

/// Changes likely to break downstream callers.
pub static BREAKING_PATTERNS: LazyLock<Vec<LabeledPattern>> = LazyLock::new(|| {
    compile(&[
        (r"class \w+", "Class definition changed"),
        (r"def \w+\([^)]*\)", "Function signature changed"),
        (r"interface \w+", "Interface changed"),
        (r"@api", "API definition changed"),
        (r"BREAKING CHANGE", "Breaking change noted in commit"),
        (r"deprecate", "Deprecation notice added"),
    ])
});
