//! Portainer stack API integration.

pub mod client;
pub(crate) mod dto;
pub mod endpoint;
pub mod settings;

pub use client::PortainerClient;
pub use settings::{HttpConfig, PortainerConfig};
