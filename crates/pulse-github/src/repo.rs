use std::fmt;
use std::str::FromStr;

use pulse_core::PulseError;

/// A repository identifier in `owner/name` form.
///
/// # Examples
///
/// ```
/// use pulse_github::RepoRef;
///
/// let repo: RepoRef = "rust-lang/rust".parse().unwrap();
/// assert_eq!(repo.owner, "rust-lang");
/// assert_eq!(repo.name, "rust");
/// assert_eq!(repo.to_string(), "rust-lang/rust");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// User or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            PulseError::Config(format!(
                "invalid repository '{s}', expected owner/repo"
            ))
        };
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        let valid_part =
            |part: &str| !part.is_empty() && !part.contains('/') && !part.contains(char::is_whitespace);
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
