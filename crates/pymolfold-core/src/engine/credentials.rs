use std::fmt;
use std::fs;
use std::path::Path;

use super::error::NvcfError;

pub const DEFAULT_API_KEY_VAR: &str = "NVCF_API_KEY";

/// A bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl Credential {
    /// Whitespace-only tokens count as missing.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Environment variable first, then the optional token file.
    pub fn resolve(env_var: &str, token_file: Option<&Path>) -> Result<Self, NvcfError> {
        if let Some(credential) = std::env::var(env_var).ok().and_then(Self::new) {
            return Ok(credential);
        }

        if let Some(path) = token_file {
            let contents = fs::read_to_string(path).map_err(|e| {
                NvcfError::Configuration(format!(
                    "could not read token file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            return Self::new(contents).ok_or_else(|| {
                NvcfError::Configuration(format!("token file '{}' is empty", path.display()))
            });
        }

        Err(NvcfError::Configuration(format!(
            "API key not found; set the {} environment variable",
            env_var
        )))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}
