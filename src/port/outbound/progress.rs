//! Progress reporting port.
//!
//! The reconciler announces each step so an operator watching a CI log can
//! follow the run. Structured diagnostics go through `tracing` instead.

use std::fmt;

/// Named step of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Authentication,
    RetrieveStack,
    Create,
    Update,
    Delete,
}

impl Step {
    /// Human-readable group title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Authentication => "Authentication",
            Self::RetrieveStack => "Retrieving Current Stack",
            Self::Create => "Stack Create",
            Self::Update => "Stack Update",
            Self::Delete => "Stack Delete",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Events emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A step started; subsequent messages belong to it.
    StepStarted(Step),
    /// Free-form status line.
    Message(String),
    /// The current step finished (successfully or not).
    StepFinished(Step),
}

/// Sink for operator-facing progress.
pub trait Progress: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Progress sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl Progress for SilentProgress {
    fn report(&self, _event: ProgressEvent) {}
}
