//! Infrastructure concerns: configuration, logging and stack file templating.

pub mod config;
pub mod template;
