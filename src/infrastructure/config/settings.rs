//! Application configuration loading and validation.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. an optional TOML file,
//! 2. `PORTAINER_*` environment variables,
//! 3. command-line flags (applied by the CLI adapter).
//!
//! The Portainer password is only ever taken from the environment.
//!
//! # Example
//!
//! ```no_run
//! use stackdeploy::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::load("stackdeploy.toml")?;
//!     config.apply_env();
//!     config.validate()?;
//!     let credentials = config.credentials()?;
//!     let intent = config.stack_intent()?;
//!     println!("{} -> {}", intent.name, credentials.url);
//!     Ok(())
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::logging::LoggingConfig;
use crate::adapter::outbound::portainer::endpoint::api_base;
use crate::adapter::outbound::portainer::PortainerConfig;
use crate::domain::{Credentials, EnvironmentId, StackIntent};
use crate::error::{ConfigError, Result};
use crate::infrastructure::template;

pub const ENV_URL: &str = "PORTAINER_URL";
pub const ENV_USERNAME: &str = "PORTAINER_USERNAME";
pub const ENV_PASSWORD: &str = "PORTAINER_PASSWORD";
pub const ENV_ENVIRONMENT_ID: &str = "PORTAINER_ENVIRONMENT_ID";

/// `[stack]` section: the desired stack and what to do with it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Stack definition; `.mustache` files are rendered with `variables`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// Remove the stack instead of updating it when it exists.
    #[serde(default)]
    pub delete: bool,
    #[serde(default)]
    pub prune: bool,
    #[serde(default)]
    pub pull_image: bool,
    /// Template view for `.mustache` stack files.
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,
}

/// Main application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portainer: PortainerConfig,
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML text. No validation is performed.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn parse_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Overlay `PORTAINER_*` variables from the process environment.
    ///
    /// A malformed `PORTAINER_ENVIRONMENT_ID` is kept out of the config and
    /// reported by [`validate`](Self::validate) as a missing field.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay environment values obtained through `lookup`.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_URL) {
            self.portainer.url = Some(url);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.portainer.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.portainer.password = Some(password);
        }
        if let Some(raw) = lookup(ENV_ENVIRONMENT_ID) {
            match raw.trim().parse::<i64>() {
                Ok(id) => self.portainer.environment_id = Some(id),
                Err(e) => debug!(value = %raw, error = %e, "Ignoring malformed {ENV_ENVIRONMENT_ID}"),
            }
        }
    }

    /// Check that every value needed for a run is present and well formed.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid field.
    pub fn validate(&self) -> Result<()> {
        self.credentials()?;

        match self.stack.name.as_deref().map(str::trim) {
            None | Some("") => return Err(ConfigError::MissingField { field: "stack.name" }.into()),
            Some(_) => {}
        }
        let file_path = self.stack.file_path.as_ref().ok_or(ConfigError::MissingField {
            field: "stack.file_path",
        })?;
        if template::is_template(file_path) && self.stack.variables.is_none() {
            return Err(ConfigError::MissingField {
                field: "stack.variables",
            }
            .into());
        }

        Ok(())
    }

    /// Build connection credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL, username, password or environment id is
    /// missing or invalid.
    pub fn credentials(&self) -> Result<Credentials> {
        let raw_url = required(self.portainer.url.as_deref(), "portainer.url")?;
        let url = Url::parse(raw_url.trim()).map_err(|e| ConfigError::InvalidValue {
            field: "url",
            reason: e.to_string(),
        })?;
        api_base(&url)?;

        let username = required(self.portainer.username.as_deref(), "portainer.username")?;
        let password = required(self.portainer.password.as_deref(), ENV_PASSWORD)?;

        let environment_id = self
            .portainer
            .environment_id
            .ok_or(ConfigError::MissingField {
                field: "portainer.environment_id",
            })?;
        if environment_id <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "environment_id",
                reason: "must be a positive integer".to_string(),
            }
            .into());
        }

        Ok(Credentials {
            url,
            username: username.to_string(),
            password: password.to_string(),
            environment_id: EnvironmentId::new(environment_id),
        })
    }

    /// Read the stack file, render it if it is a template, and combine it
    /// with the configured flags.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing, the file cannot be
    /// read, or template rendering fails.
    pub fn stack_intent(&self) -> Result<StackIntent> {
        let name = required(self.stack.name.as_deref(), "stack.name")?;
        let path = self.stack.file_path.as_ref().ok_or(ConfigError::MissingField {
            field: "stack.file_path",
        })?;

        let mut content =
            fs::read_to_string(path).map_err(|source| ConfigError::ReadStackFile {
                path: path.display().to_string(),
                source,
            })?;

        if template::is_template(path) {
            let view = self
                .stack
                .variables
                .clone()
                .map(Value::Object)
                .ok_or(ConfigError::MissingField {
                    field: "stack.variables",
                })?;
            debug!(path = %path.display(), "Rendering stack template");
            content = template::render(&content, &view)?;
        }

        Ok(StackIntent::new(name.trim(), content)
            .with_delete(self.stack.delete)
            .with_prune(self.stack.prune)
            .with_pull_image(self.stack.pull_image))
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField { field }.into()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::Error;

    const FULL: &str = r#"
[portainer]
url = "https://portainer.example.com"
username = "deployer"
environment_id = 2

[portainer.http]
timeout_ms = 30000

[stack]
name = "web"
file_path = "stack.yml"
prune = true

[logging]
level = "debug"
format = "json"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parses_full_config() {
        let config = Config::parse_toml(FULL).unwrap();
        assert_eq!(config.portainer.url.as_deref(), Some("https://portainer.example.com"));
        assert_eq!(config.portainer.environment_id, Some(2));
        assert_eq!(config.portainer.http.timeout_ms, Some(30_000));
        assert_eq!(config.portainer.http.connect_timeout_ms, None);
        assert_eq!(config.stack.name.as_deref(), Some("web"));
        assert!(config.stack.prune);
        assert!(!config.stack.pull_image);
        assert!(!config.stack.delete);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert!(config.portainer.url.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn password_in_file_is_ignored() {
        let config = Config::parse_toml("[portainer]\npassword = \"leak\"\n").unwrap();
        assert!(config.portainer.password.is_none());
    }

    #[test]
    fn variables_table_becomes_json_view() {
        let config = Config::parse_toml(
            "[stack.variables]\nimage_tag = \"1.4.2\"\nreplicas = 3\n[stack.variables.db]\nhost = \"pg\"\n",
        )
        .unwrap();
        let vars = config.stack.variables.unwrap();
        assert_eq!(vars["image_tag"], "1.4.2");
        assert_eq!(vars["replicas"], 3);
        assert_eq!(vars["db"]["host"], "pg");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.apply_env_from(env(&[
            (ENV_URL, "http://10.0.0.5:9000"),
            (ENV_PASSWORD, "s3cret"),
            (ENV_ENVIRONMENT_ID, " 5 "),
        ]));

        let creds = config.credentials().unwrap();
        assert_eq!(creds.url.as_str(), "http://10.0.0.5:9000/");
        assert_eq!(creds.username, "deployer");
        assert_eq!(creds.password, "s3cret");
        assert_eq!(creds.environment_id, EnvironmentId::new(5));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.apply_env_from(env(&[(ENV_USERNAME, "  "), (ENV_ENVIRONMENT_ID, "two")]));
        assert_eq!(config.portainer.username.as_deref(), Some("deployer"));
        assert_eq!(config.portainer.environment_id, Some(2));
    }

    #[test]
    fn missing_password_is_reported() {
        let config = Config::parse_toml(FULL).unwrap();
        match config.credentials() {
            Err(Error::Config(ConfigError::MissingField { field })) => {
                assert_eq!(field, ENV_PASSWORD);
            }
            other => panic!("expected missing password, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_environment() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.portainer.password = Some("pw".into());
        config.portainer.environment_id = Some(0);
        assert!(matches!(
            config.credentials(),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "environment_id",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_unparseable_url() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.portainer.password = Some("pw".into());
        config.portainer.url = Some("portainer.example.com".into());
        assert!(matches!(
            config.credentials(),
            Err(Error::Config(ConfigError::InvalidValue { field: "url", .. }))
        ));
    }

    #[test]
    fn template_without_variables_fails_validation() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.portainer.password = Some("pw".into());
        config.stack.file_path = Some(PathBuf::from("stack.yml.mustache"));
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::MissingField {
                field: "stack.variables"
            }))
        ));
    }

    #[test]
    fn validate_accepts_complete_config() {
        let mut config = Config::parse_toml(FULL).unwrap();
        config.portainer.password = Some("pw".into());
        config.validate().unwrap();
    }
}
