use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DevkitError;

/// Top-level configuration loaded from `.devkit.toml`.
///
/// Every section falls back to its defaults when absent. Only the assistant
/// API key is read from the environment, when `[assist].api_key` is unset.
///
/// # Examples
///
/// ```
/// use devkit_core::DevkitConfig;
///
/// let config = DevkitConfig::default();
/// assert_eq!(config.git.program, "git");
/// assert_eq!(config.review.high_impact_threshold, 100);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevkitConfig {
    /// Command-generation assistant settings.
    #[serde(default)]
    pub assist: AssistConfig,
    /// Version-control executable settings.
    #[serde(default)]
    pub git: GitConfig,
    /// Release helpers (version bumping).
    #[serde(default)]
    pub release: ReleaseConfig,
    /// Diff review tuning.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl DevkitConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Io`] if the file cannot be read, or
    /// [`DevkitError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use devkit_core::DevkitConfig;
    /// use std::path::Path;
    ///
    /// let config = DevkitConfig::from_file(Path::new(".devkit.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, DevkitError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`DevkitError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_core::DevkitConfig;
    ///
    /// let toml = r#"
    /// [assist]
    /// model = "llama3-70b-8192"
    /// "#;
    /// let config = DevkitConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.assist.model, "llama3-70b-8192");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, DevkitError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Settings for the natural-language command assistant.
///
/// Any OpenAI-compatible chat completions endpoint works; `provider` only
/// selects the default base URL and the API key environment variable.
///
/// # Examples
///
/// ```
/// use devkit_core::AssistConfig;
///
/// let config = AssistConfig::default();
/// assert_eq!(config.provider, "groq");
/// assert_eq!(config.api_key_env(), "GROQ_API_KEY");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Provider name (`"groq"`, `"openai"`, `"ollama"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; falls back to the provider's environment variable.
    pub api_key: Option<String>,
    /// Custom base URL, including the API version segment.
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider() -> String {
    "groq".into()
}

fn default_model() -> String {
    "llama3-8b-8192".into()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AssistConfig {
    /// Environment variable consulted when `api_key` is unset.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            "ollama" => "OLLAMA_API_KEY",
            _ => "GROQ_API_KEY",
        }
    }

    /// Base URL for the chat completions endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use devkit_core::AssistConfig;
    ///
    /// let config = AssistConfig::default();
    /// assert_eq!(config.resolved_base_url(), "https://api.groq.com/openai/v1");
    /// ```
    pub fn resolved_base_url(&self) -> &str {
        if let Some(url) = self.base_url.as_deref() {
            return url.trim_end_matches('/');
        }
        match self.provider.as_str() {
            "openai" => "https://api.openai.com/v1",
            "ollama" => "http://localhost:11434/v1",
            _ => "https://api.groq.com/openai/v1",
        }
    }
}

/// Version-control executable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Program invoked wherever a command starts with `git` (default: `"git"`).
    #[serde(default = "default_git_program")]
    pub program: String,
}

fn default_git_program() -> String {
    "git".into()
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: default_git_program(),
        }
    }
}

/// Release helper settings.
///
/// # Examples
///
/// ```
/// use devkit_core::ReleaseConfig;
///
/// let config = ReleaseConfig::default();
/// assert_eq!(config.version_files[0], "setup.py");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Files scanned, in order, for the first `MAJOR.MINOR.PATCH` string.
    #[serde(default = "default_version_files")]
    pub version_files: Vec<String>,
}

fn default_version_files() -> Vec<String> {
    ["setup.py", "package.json", "VERSION", "__init__.py"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version_files: default_version_files(),
        }
    }
}

/// Diff review tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Changed-line count above which a diff is flagged high impact (default: 100).
    #[serde(default = "default_high_impact_threshold")]
    pub high_impact_threshold: usize,
}

fn default_high_impact_threshold() -> usize {
    100
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            high_impact_threshold: default_high_impact_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = DevkitConfig::default();
        assert_eq!(config.assist.provider, "groq");
        assert_eq!(config.assist.model, "llama3-8b-8192");
        assert_eq!(config.assist.timeout_secs, 60);
        assert!(config.assist.api_key.is_none());
        assert_eq!(config.git.program, "git");
        assert_eq!(
            config.release.version_files,
            vec!["setup.py", "package.json", "VERSION", "__init__.py"]
        );
        assert_eq!(config.review.high_impact_threshold, 100);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[assist]
provider = "openai"
model = "gpt-4o-mini"
base_url = "https://proxy.internal/v1/"
timeout_secs = 15

[git]
program = "/usr/local/bin/git"

[release]
version_files = ["Cargo.toml"]

[review]
high_impact_threshold = 250
"#;
        let config = DevkitConfig::from_toml(toml).unwrap();
        assert_eq!(config.assist.provider, "openai");
        assert_eq!(config.assist.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.assist.resolved_base_url(), "https://proxy.internal/v1");
        assert_eq!(config.assist.timeout_secs, 15);
        assert_eq!(config.git.program, "/usr/local/bin/git");
        assert_eq!(config.release.version_files, vec!["Cargo.toml"]);
        assert_eq!(config.review.high_impact_threshold, 250);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = DevkitConfig::from_toml("").unwrap();
        assert_eq!(config.assist.model, "llama3-8b-8192");
        assert_eq!(config.git.program, "git");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = DevkitConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(DevkitError::Toml(_))));
    }

    #[test]
    fn provider_base_urls() {
        let mut config = AssistConfig::default();
        assert_eq!(config.resolved_base_url(), "https://api.groq.com/openai/v1");
        config.provider = "openai".into();
        assert_eq!(config.resolved_base_url(), "https://api.openai.com/v1");
        config.provider = "ollama".into();
        assert_eq!(config.resolved_base_url(), "http://localhost:11434/v1");
    }
}
