//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`StackApi`] - Remote stack orchestration (Portainer)
//! - [`Progress`] - Operator-facing step reporting

pub mod outbound;

pub use outbound::progress::{Progress, ProgressEvent, SilentProgress, Step};
pub use outbound::stack_api::StackApi;
