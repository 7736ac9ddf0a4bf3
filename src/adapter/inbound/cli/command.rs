//! Command-line interface definitions.
//!
//! Every non-secret configuration value can be given as a flag; flags
//! override the config file and `PORTAINER_*` environment variables.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;

/// Create, update or delete a Portainer swarm stack
#[derive(Parser, Debug)]
#[command(name = "stackdeploy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Forced color state, or `None` to detect.
    #[must_use]
    pub const fn forced(self) -> Option<bool> {
        match self {
            Self::Auto => None,
            Self::Always => Some(true),
            Self::Never => Some(false),
        }
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile the stack: create, update or delete it
    Deploy(Box<DeployArgs>),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `stackdeploy check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration without contacting Portainer
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `deploy` subcommand.
#[derive(Parser, Debug, Default)]
pub struct DeployArgs {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Portainer base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Portainer username (password comes from PORTAINER_PASSWORD)
    #[arg(long)]
    pub username: Option<String>,

    /// Portainer environment (endpoint) ID
    #[arg(long)]
    pub environment_id: Option<i64>,

    /// Name of the stack to reconcile
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Stack definition file (.mustache files are rendered)
    #[arg(long)]
    pub stack_file: Option<PathBuf>,

    /// Template variables as a JSON object
    #[arg(long)]
    pub variables: Option<String>,

    /// Delete the stack if it exists instead of updating it
    #[arg(long)]
    pub delete: bool,

    /// Prune services no longer in the stack file on update
    #[arg(long)]
    pub prune: bool,

    /// Force image re-pull on update
    #[arg(long)]
    pub pull_image: bool,

    /// Authenticate and report the planned action without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}

impl DeployArgs {
    /// Apply flag overrides on top of file and environment values.
    ///
    /// Boolean flags can only switch an option on.
    ///
    /// # Errors
    ///
    /// Returns an error if `--variables` is not a JSON object.
    pub fn apply_to(&self, config: &mut Config) -> Result<()> {
        if let Some(url) = &self.url {
            config.portainer.url = Some(url.clone());
        }
        if let Some(username) = &self.username {
            config.portainer.username = Some(username.clone());
        }
        if let Some(id) = self.environment_id {
            config.portainer.environment_id = Some(id);
        }
        if let Some(name) = &self.stack_name {
            config.stack.name = Some(name.clone());
        }
        if let Some(path) = &self.stack_file {
            config.stack.file_path = Some(path.clone());
        }
        if let Some(raw) = &self.variables {
            config.stack.variables = Some(parse_variables(raw)?);
        }
        if self.delete {
            config.stack.delete = true;
        }
        if self.prune {
            config.stack.prune = true;
        }
        if self.pull_image {
            config.stack.pull_image = true;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }
        Ok(())
    }
}

fn parse_variables(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConfigError::InvalidValue {
            field: "variables",
            reason: "expected a JSON object".to_string(),
        }
        .into()),
        Err(e) => Err(ConfigError::InvalidValue {
            field: "variables",
            reason: e.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::error::Error;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "stackdeploy");
    }

    #[test]
    fn test_parse_deploy_defaults() {
        let cli = Cli::try_parse_from(["stackdeploy", "deploy"]).unwrap();
        let Commands::Deploy(args) = cli.command else {
            panic!("expected deploy");
        };
        assert!(args.config.is_none());
        assert!(!args.delete);
        assert!(!args.prune);
        assert!(!args.pull_image);
        assert!(!args.dry_run);
        assert!(matches!(cli.color, ColorChoice::Auto));
    }

    #[test]
    fn test_parse_deploy_flags() {
        let cli = Cli::try_parse_from([
            "stackdeploy",
            "--color",
            "never",
            "deploy",
            "--url",
            "https://portainer.local",
            "--environment-id",
            "2",
            "--stack-name",
            "web",
            "--stack-file",
            "stack.yml",
            "--prune",
            "--pull-image",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.color.forced(), Some(false));
        let Commands::Deploy(args) = cli.command else {
            panic!("expected deploy");
        };
        assert_eq!(args.environment_id, Some(2));
        assert_eq!(args.stack_name.as_deref(), Some("web"));
        assert!(args.prune && args.pull_image && args.dry_run);
        assert!(!args.delete);
    }

    #[test]
    fn test_parse_check_config() {
        let cli =
            Cli::try_parse_from(["stackdeploy", "check", "config", "-c", "deploy.toml"]).unwrap();
        let Commands::Check(CheckCommand::Config(arg)) = cli.command else {
            panic!("expected check config");
        };
        assert_eq!(arg.config, Some(PathBuf::from("deploy.toml")));
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::parse_toml(
            "[portainer]\nurl = \"https://old\"\nenvironment_id = 1\n[stack]\nname = \"old\"\nprune = true\n",
        )
        .unwrap();
        let args = DeployArgs {
            url: Some("https://new".into()),
            environment_id: Some(4),
            stack_name: Some("web".into()),
            variables: Some(r#"{"tag":"1.0"}"#.into()),
            delete: true,
            json_logs: true,
            ..DeployArgs::default()
        };

        args.apply_to(&mut config).unwrap();

        assert_eq!(config.portainer.url.as_deref(), Some("https://new"));
        assert_eq!(config.portainer.environment_id, Some(4));
        assert_eq!(config.stack.name.as_deref(), Some("web"));
        assert!(config.stack.delete);
        assert!(config.stack.prune, "unset flag keeps file value");
        assert_eq!(config.stack.variables.unwrap()["tag"], "1.0");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn variables_must_be_an_object() {
        let mut config = Config::default();
        let args = DeployArgs {
            variables: Some("[1, 2]".into()),
            ..DeployArgs::default()
        };
        assert!(matches!(
            args.apply_to(&mut config),
            Err(Error::Config(ConfigError::InvalidValue {
                field: "variables",
                ..
            }))
        ));
    }
}
