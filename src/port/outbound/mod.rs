//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod progress;
pub mod stack_api;
