//! Local player identity.
//!
//! The username and bearer token come from the authentication service. They
//! are checked here so a bad credential never reaches the connection layer.

use std::fmt;

/// Username plus bearer token for one player.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    token: String,
}

impl Credential {
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let username = username.into().trim().to_string();
        let token = token.into().trim().to_string();

        if username.is_empty() {
            return Err(CredentialError::MissingUsername);
        }
        if token.is_empty() {
            return Err(CredentialError::MissingToken);
        }
        // The token is sent as a query parameter without escaping.
        if let Some(c) = token.chars().find(|c| !is_token_char(*c)) {
            return Err(CredentialError::InvalidToken(c));
        }

        Ok(Self { username, token })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~')
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A credential that cannot be used to connect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no username; log in first")]
    MissingUsername,
    #[error("no access token; log in first")]
    MissingToken,
    #[error("access token contains invalid character {0:?}")]
    InvalidToken(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_jwt_shaped_token() {
        let cred = Credential::new("alice", " eyJhbGciOi.eyJzdWIi.sig-_x ").unwrap();
        assert_eq!(cred.username(), "alice");
        assert_eq!(cred.token(), "eyJhbGciOi.eyJzdWIi.sig-_x");
    }

    #[test]
    fn rejects_missing_parts() {
        assert_eq!(
            Credential::new("", "tok"),
            Err(CredentialError::MissingUsername)
        );
        assert_eq!(
            Credential::new("alice", "  "),
            Err(CredentialError::MissingToken)
        );
        assert_eq!(
            Credential::new("alice", "a&b"),
            Err(CredentialError::InvalidToken('&'))
        );
    }

    #[test]
    fn debug_hides_token() {
        let cred = Credential::new("alice", "secret").unwrap();
        let shown = format!("{:?}", cred);
        assert!(shown.contains("alice"));
        assert!(!shown.contains("secret"));
    }
}
