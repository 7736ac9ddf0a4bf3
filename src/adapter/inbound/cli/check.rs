//! Handler for `check config`.

use std::path::Path;

use crate::adapter::inbound::cli::{config, output};
use crate::error::Result;
use crate::infrastructure::template;

/// Validate configuration without contacting Portainer.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let config = config::load(config_path)?;
    config.validate()?;
    let credentials = config.credentials()?;

    output::group("Configuration Check");
    match config_path {
        Some(path) => output::field("Config", path.display()),
        None => output::field("Config", "environment only"),
    }
    output::field("URL", &credentials.url);
    output::field("Username", &credentials.username);
    output::field("Environment", credentials.environment_id);

    if let Some(file) = &config.stack.file_path {
        output::field("Stack", config.stack.name.as_deref().unwrap_or_default());
        output::field("Stack file", file.display());
        if template::is_template(file) {
            output::field("Template", "mustache");
        }
        if !file.exists() {
            output::warning(&format!("Stack file {} does not exist", file.display()));
        }
    }
    output::field("Delete", config.stack.delete);
    output::field("Prune", config.stack.prune);
    output::field("Pull image", config.stack.pull_image);
    output::end_group();

    output::success("Configuration is valid");
    Ok(())
}
