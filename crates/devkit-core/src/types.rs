use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Result;

/// How a subcommand renders its result.
///
/// Derives [`clap::ValueEnum`], so the binary takes it straight from
/// `--format`; `md` is accepted for markdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Pretty-printed JSON with camelCase keys.
    Json,
    /// GitHub-flavored markdown.
    #[value(alias = "md")]
    Markdown,
}

impl OutputFormat {
    /// Pretty-printed JSON for `value`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DevkitError::Serialization`] when `value` cannot be
    /// represented as JSON (for example a map with non-string keys).
    pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Render a flat list under `title`, or the `empty` note when there is
    /// nothing to show. JSON output is the bare array either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_core::OutputFormat;
    ///
    /// let files = vec!["src/app.py".to_string()];
    /// let md = OutputFormat::Markdown.render_list("Conflicted files", "No conflicts", &files).unwrap();
    /// assert_eq!(md, "## Conflicted files\n\n- src/app.py\n");
    ///
    /// let text = OutputFormat::Text.render_list("Conflicted files", "No conflicts", &[]).unwrap();
    /// assert_eq!(text, "No conflicts\n");
    /// ```
    pub fn render_list(self, title: &str, empty: &str, items: &[String]) -> Result<String> {
        let out = match self {
            OutputFormat::Json => format!("{}\n", Self::to_json(items)?),
            OutputFormat::Markdown if items.is_empty() => format!("## {title}\n\n_{empty}_\n"),
            OutputFormat::Markdown => {
                let body: String = items.iter().map(|i| format!("- {i}\n")).collect();
                format!("## {title}\n\n{body}")
            }
            OutputFormat::Text if items.is_empty() => format!("{empty}\n"),
            OutputFormat::Text => {
                let body: String = items.iter().map(|i| format!("  {i}\n")).collect();
                format!("{title}:\n{body}")
            }
        };
        Ok(out)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use clap::ValueEnum;

    use super::*;
    use crate::DevkitError;

    #[test]
    fn parses_names_and_alias() {
        assert_eq!(OutputFormat::from_str("json", false), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("md", false), Ok(OutputFormat::Markdown));
        assert_eq!(OutputFormat::from_str("JSON", true), Ok(OutputFormat::Json));
        assert!(OutputFormat::from_str("xml", true).is_err());
    }

    #[test]
    fn display_matches_value_names() {
        for format in OutputFormat::value_variants() {
            let name = format.to_possible_value().map(|v| v.get_name().to_string());
            assert_eq!(name, Some(format.to_string()));
        }
    }

    #[test]
    fn text_list_is_indented_under_title() {
        let items = vec!["main".to_string(), "feature/x".to_string()];
        let text = OutputFormat::Text.render_list("Branches", "No branches", &items).unwrap();
        assert_eq!(text, "Branches:\n  main\n  feature/x\n");
    }

    #[test]
    fn json_list_is_a_bare_array_even_when_empty() {
        let json = OutputFormat::Json.render_list("Branches", "No branches", &[]).unwrap();
        assert_eq!(json, "[]\n");
    }

    #[test]
    fn empty_markdown_list_shows_note() {
        let md = OutputFormat::Markdown.render_list("Reviewers", "No reviewers found", &[]).unwrap();
        assert_eq!(md, "## Reviewers\n\n_No reviewers found_\n");
    }

    #[test]
    fn non_string_map_keys_are_a_serialization_error() {
        let map = HashMap::from([((1, 2), "pair")]);
        assert!(matches!(
            OutputFormat::to_json(&map),
            Err(DevkitError::Serialization(_))
        ));
    }
}
