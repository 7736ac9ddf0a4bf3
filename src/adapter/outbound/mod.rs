//! Outbound adapters (driven side).

pub mod portainer;
