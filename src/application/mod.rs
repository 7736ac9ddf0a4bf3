//! Application services (use cases).
//!
//! These services orchestrate domain logic and drive the outbound ports.

pub mod reconcile;
