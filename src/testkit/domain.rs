//! Builders for domain values used across tests.

use url::Url;

use crate::domain::{Credentials, EnvironmentId, StackIntent};

/// Environment id used by [`credentials`].
pub const TEST_ENVIRONMENT: i64 = 2;

/// Credentials pointing at `url` with fixed user, password and environment.
///
/// # Panics
///
/// Panics if `url` is not a valid URL.
pub fn credentials_for(url: &str) -> Credentials {
    Credentials {
        url: Url::parse(url).expect("valid test url"),
        username: "deployer".to_string(),
        password: "s3cret".to_string(),
        environment_id: EnvironmentId::new(TEST_ENVIRONMENT),
    }
}

/// Credentials for a Portainer instance that is never contacted.
pub fn credentials() -> Credentials {
    credentials_for("https://portainer.test")
}

/// A minimal compose file for `name`.
pub fn compose(name: &str) -> String {
    format!("version: \"3.8\"\nservices:\n  {name}:\n    image: nginx:alpine\n")
}

/// Intent to deploy `name` with a minimal compose file.
pub fn intent(name: &str) -> StackIntent {
    StackIntent::new(name, compose(name))
}
