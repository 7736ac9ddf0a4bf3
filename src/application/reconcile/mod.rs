//! Stack reconciliation use case.
//!
//! [`determine_action`] is the only branching decision in the system;
//! [`Reconciler`] sequences the remote calls around it.

mod action;
mod reconciler;

pub use action::{determine_action, find_stack, ReconcileAction, ReconcileOutcome};
pub use reconciler::{Phase, Reconciler};
