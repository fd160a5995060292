/// Errors that can occur across issuepulse.
///
/// Library crates use this type directly; the binary crate converts to
/// `miette::Report` at the boundary.
///
/// # Examples
///
/// ```
/// use pulse_core::PulseError;
///
/// let err = PulseError::Config("bad repository reference".into());
/// assert!(err.to_string().contains("bad repository reference"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum PulseError {
    /// Filesystem or terminal I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(issuepulse::io))]
    Io(#[from] std::io::Error),

    /// Invalid configuration or command-line input.
    #[error("configuration error: {0}")]
    #[diagnostic(code(issuepulse::config))]
    Config(String),

    /// A required credential was not found in config or environment.
    #[error("missing credential: {name} is not set")]
    #[diagnostic(
        code(issuepulse::credentials),
        help("set it in the environment or a .env file")
    )]
    MissingCredential {
        /// Environment variable that should carry the credential.
        name: String,
    },

    /// GitHub API or transport failure.
    #[error("GitHub error: {0}")]
    #[diagnostic(code(issuepulse::github))]
    GitHub(String),

    /// LLM API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(issuepulse::llm))]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(issuepulse::json))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(issuepulse::toml))]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: PulseError = io_err.into();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn missing_credential_names_variable() {
        let err = PulseError::MissingCredential {
            name: "GITHUB_TOKEN".into(),
        };
        assert_eq!(err.to_string(), "missing credential: GITHUB_TOKEN is not set");
    }

    #[test]
    fn github_error_displays_message() {
        let err = PulseError::GitHub("status 404".into());
        assert_eq!(err.to_string(), "GitHub error: status 404");
    }

    #[test]
    fn converts_into_report_with_code_and_help() {
        use miette::Diagnostic;

        let err = PulseError::MissingCredential {
            name: "OPENAI_API_KEY".into(),
        };
        assert_eq!(err.code().unwrap().to_string(), "issuepulse::credentials");
        assert!(err.help().unwrap().to_string().contains(".env"));

        let report: miette::Report = PulseError::Config("bad".into()).into();
        assert_eq!(report.to_string(), "configuration error: bad");
    }
}
