//! Connection credentials and the session obtained from them.

use std::fmt;

use url::Url;

use super::id::EnvironmentId;

/// Everything needed to reach and authenticate against a Portainer instance.
#[derive(Clone)]
pub struct Credentials {
    pub url: Url,
    pub username: String,
    pub password: String,
    pub environment_id: EnvironmentId,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("environment_id", &self.environment_id)
            .finish()
    }
}

/// Bearer token returned by a successful authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Session(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let creds = Credentials {
            url: Url::parse("https://portainer.local").unwrap(),
            username: "admin".into(),
            password: "s3cret".into(),
            environment_id: EnvironmentId::new(2),
        };
        assert!(!format!("{creds:?}").contains("s3cret"));

        let session = Session::new("eyJhbGciOi");
        assert_eq!(session.token(), "eyJhbGciOi");
        assert!(!format!("{session:?}").contains("eyJ"));
    }
}
