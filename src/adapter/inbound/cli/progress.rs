//! Console implementation of the progress port.

use super::output;
use crate::port::{Progress, ProgressEvent};

/// Renders reconciliation steps through the CLI output helpers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StepStarted(step) => output::group(step.title()),
            ProgressEvent::Message(message) => output::note(&message),
            ProgressEvent::StepFinished(_) => output::end_group(),
        }
    }
}
