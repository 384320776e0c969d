//! Authentication handling for the Gitea API.

use secrecy::SecretString;

use crate::error::{Error, Result};

/// Authentication method for the Gitea API.
#[derive(Debug, Clone)]
pub enum Auth {
    /// Use token from environment variable.
    EnvVar(String),

    /// Use a specific token.
    Token(SecretString),
}

impl Auth {
    /// Resolve the authentication to a token.
    ///
    /// # Errors
    /// Returns [`Error::NoToken`] if the variable is unset or blank.
    pub fn resolve(&self) -> Result<SecretString> {
        match self {
            Self::EnvVar(var) => std::env::var(var)
                .ok()
                .filter(|t| !t.trim().is_empty())
                .map(SecretString::from)
                .ok_or(Error::NoToken),
            Self::Token(t) => Ok(t.clone()),
        }
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self::EnvVar("GITEA_TOKEN".into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_token_auth() {
        let auth = Auth::Token(SecretString::from("test_token"));
        assert_eq!(auth.resolve().unwrap().expose_secret(), "test_token");
    }

    #[test]
    fn test_missing_env_var_is_no_token() {
        let auth = Auth::EnvVar("WAVE_TEST_TOKEN_THAT_IS_NEVER_SET".into());
        assert!(matches!(auth.resolve(), Err(Error::NoToken)));
    }
}
