use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Top-level configuration loaded from `.issuepulse.toml`.
///
/// Supports layered resolution: CLI flags > env vars > local config > defaults.
///
/// # Examples
///
/// ```
/// use pulse_core::PulseConfig;
///
/// let config = PulseConfig::default();
/// assert_eq!(config.github.api_url, "https://api.github.com");
/// assert!(!config.review.post_replies);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PulseConfig {
    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review and reply settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl PulseConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Io`] if the file cannot be read, or
    /// [`PulseError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, PulseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use pulse_core::PulseConfig;
    ///
    /// let config = PulseConfig::from_toml("[llm]\nprovider = \"gemini\"").unwrap();
    /// assert_eq!(config.llm.provider, "gemini");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, PulseError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// GitHub API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Access token. Falls back to `GITHUB_TOKEN`, then `GH_TOKEN`.
    pub token: Option<String>,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Environment variable reported when no token can be found.
    pub const TOKEN_ENV_VAR: &'static str = "GITHUB_TOKEN";

    /// Resolve the access token from config, then `GITHUB_TOKEN`, then `GH_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::MissingCredential`] when none is set.
    pub fn resolve_token(&self) -> Result<String, PulseError> {
        non_empty(self.token.clone())
            .or_else(|| non_empty(std::env::var(Self::TOKEN_ENV_VAR).ok()))
            .or_else(|| non_empty(std::env::var("GH_TOKEN").ok()))
            .ok_or_else(|| PulseError::MissingCredential {
                name: Self::TOKEN_ENV_VAR.into(),
            })
    }
}

/// LLM provider configuration.
///
/// Both supported providers are reached through an OpenAI-compatible
/// `/chat/completions` endpoint.
///
/// # Examples
///
/// ```
/// use pulse_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.provider, "openai");
/// assert_eq!(config.model(), "gpt-4o-mini");
/// assert_eq!(config.api_key_env_var(), "OPENAI_API_KEY");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (`"openai"` or `"gemini"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier. Provider default when omitted.
    pub model: Option<String>,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL, including the API version segment.
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
        }
    }
}

impl LlmConfig {
    /// Environment variable holding the key for the configured provider.
    pub fn api_key_env_var(&self) -> &'static str {
        match self.provider.as_str() {
            "gemini" => "GEMINI_API_KEY",
            _ => "OPENAI_API_KEY",
        }
    }

    /// Model to request, falling back to the provider default.
    pub fn model(&self) -> &str {
        match &self.model {
            Some(model) => model,
            None => match self.provider.as_str() {
                "gemini" => "gemini-2.0-flash",
                _ => "gpt-4o-mini",
            },
        }
    }

    /// Base URL for chat completions, without a trailing slash.
    pub fn base_url(&self) -> &str {
        let url = match &self.base_url {
            Some(url) => url.as_str(),
            None => match self.provider.as_str() {
                "gemini" => "https://generativelanguage.googleapis.com/v1beta/openai",
                _ => "https://api.openai.com/v1",
            },
        };
        url.trim_end_matches('/')
    }

    /// Resolve the API key from config, then the provider's env variable.
    ///
    /// # Errors
    ///
    /// Returns [`PulseError::MissingCredential`] when neither is set.
    pub fn resolve_api_key(&self) -> Result<String, PulseError> {
        let env_var = self.api_key_env_var();
        non_empty(self.api_key.clone())
            .or_else(|| non_empty(std::env::var(env_var).ok()))
            .ok_or_else(|| PulseError::MissingCredential {
                name: env_var.into(),
            })
    }
}

/// Review and reply-posting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Post each generated review back to the item as a comment.
    #[serde(default)]
    pub post_replies: bool,
    /// Posted replies are truncated to this many characters (default: 65536).
    #[serde(default = "default_max_reply_chars")]
    pub max_reply_chars: usize,
}

fn default_max_reply_chars() -> usize {
    65536
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            post_replies: false,
            max_reply_chars: default_max_reply_chars(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = PulseConfig::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.base_url(), "https://api.openai.com/v1");
        assert!(!config.review.post_replies);
        assert_eq!(config.review.max_reply_chars, 65536);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PulseConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model(), "gpt-4o-mini");
        assert_eq!(config.github.api_url, "https://api.github.com");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[github]
api_url = "https://ghe.example.com/api/v3"

[llm]
provider = "gemini"
base_url = "http://localhost:8080/v1/"

[review]
post_replies = true
max_reply_chars = 1000
"#;
        let config = PulseConfig::from_toml(toml).unwrap();
        assert_eq!(config.github.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.llm.api_key_env_var(), "GEMINI_API_KEY");
        assert_eq!(config.llm.model(), "gemini-2.0-flash");
        assert_eq!(config.llm.base_url(), "http://localhost:8080/v1");
        assert!(config.review.post_replies);
        assert_eq!(config.review.max_reply_chars, 1000);
    }

    #[test]
    fn explicit_model_overrides_provider_default() {
        let config = LlmConfig {
            model: Some("gpt-4o".into()),
            ..LlmConfig::default()
        };
        assert_eq!(config.model(), "gpt-4o");
    }

    #[test]
    fn configured_credentials_win() {
        let github = GitHubConfig {
            token: Some("ghp_config".into()),
            ..GitHubConfig::default()
        };
        assert_eq!(github.resolve_token().unwrap(), "ghp_config");

        let llm = LlmConfig {
            api_key: Some("sk-config".into()),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key().unwrap(), "sk-config");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = PulseConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
