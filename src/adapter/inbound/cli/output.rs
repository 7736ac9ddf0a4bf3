//! Operator-facing CLI output.
//!
//! Plain terminals get colored status lines. Under GitHub Actions the same
//! calls emit workflow commands (`::group::`, `::endgroup::`, `::error::`)
//! so each reconciliation step folds into its own log group.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};

/// Environment variable GitHub sets on every workflow runner.
pub const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Emit GitHub Actions workflow commands.
    pub github: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(quiet: bool, github: bool) -> Self {
        Self { quiet, github }
    }

    /// Detect GitHub Actions from the process environment.
    #[must_use]
    pub fn detect(quiet: bool) -> Self {
        let github = std::env::var(GITHUB_ACTIONS_ENV).is_ok_and(|v| v == "true");
        Self::new(quiet, github)
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply output settings. Call early in the entry point.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Force colors on or off; `None` restores terminal detection.
pub fn set_color(enabled: Option<bool>) {
    match enabled {
        Some(on) => owo_colors::set_override(on),
        None => owo_colors::unset_override(),
    }
}

/// Escape a value for use in a workflow command message.
fn workflow_escape(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Open a named group of output.
pub fn group(title: &str) {
    let config = read_config();
    if config.github {
        println!("::group::{}", workflow_escape(title));
        return;
    }
    if config.quiet {
        return;
    }

    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Close the current group.
pub fn end_group() {
    if read_config().github {
        println!("::endgroup::");
    }
}

/// Print a progress line.
pub fn note(message: &str) {
    let config = read_config();
    if config.quiet && !config.github {
        return;
    }
    println!("  {message}");
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    if read_config().quiet {
        return;
    }
    println!(
        "  {:<14} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    if read_config().quiet {
        return;
    }
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print a warning line.
pub fn warning(message: &str) {
    if read_config().github {
        println!("::warning::{}", workflow_escape(message));
        return;
    }
    println!(
        "  {} {}",
        "⚠".if_supports_color(Stream::Stdout, |t| t.yellow()),
        message
    );
}

/// Print an error line.
pub fn error(message: &str) {
    if read_config().github {
        println!("::error::{}", workflow_escape(message));
        return;
    }
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}
