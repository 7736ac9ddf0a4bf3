//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`api`]: `RecordingStackApi`, a scripted in-memory
//!   [`StackApi`](crate::port::StackApi) that records every call.
//! - [`domain`]: builders for credentials and intents.

pub mod api;
pub mod domain;
