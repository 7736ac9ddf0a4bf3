//! Configuration loading shared by CLI handlers.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Load the config file when one is given, then overlay the environment.
///
/// Without a file every value must come from the environment or flags.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            Config::load(path)?
        }
        None => Config::default(),
    };
    config.apply_env();
    Ok(config)
}
