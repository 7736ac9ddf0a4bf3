//! Reconciliation decision: which single mutation a run performs.

use std::fmt;

use crate::domain::{RemoteStack, StackId, StackIntent};

/// The one mutation a run will perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// No stack with the desired name exists.
    Create,
    /// Replace the content of the existing stack.
    Update { id: StackId },
    /// Remove the existing stack.
    Delete { id: StackId },
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update { id } => write!(f, "update stack {id}"),
            Self::Delete { id } => write!(f, "delete stack {id}"),
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(RemoteStack),
    Updated(RemoteStack),
    Deleted(StackId),
}

/// First stack whose name matches exactly (case-sensitive).
///
/// Names are unique per cluster on the remote side; if duplicates ever come
/// back, the first in listing order wins.
#[must_use]
pub fn find_stack<'a>(stacks: &'a [RemoteStack], name: &str) -> Option<&'a RemoteStack> {
    stacks.iter().find(|stack| stack.name == name)
}

/// Decide the mutation for `intent` given the stacks currently on the cluster.
///
/// The delete flag only matters when the stack exists; prune and pull-image
/// never influence the decision.
#[must_use]
pub fn determine_action(intent: &StackIntent, stacks: &[RemoteStack]) -> ReconcileAction {
    match find_stack(stacks, &intent.name) {
        None => ReconcileAction::Create,
        Some(stack) if intent.delete => ReconcileAction::Delete { id: stack.id },
        Some(stack) => ReconcileAction::Update { id: stack.id },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stacks() -> Vec<RemoteStack> {
        vec![
            RemoteStack::new(3, "api"),
            RemoteStack::new(5, "worker"),
            RemoteStack::new(7, "web"),
        ]
    }

    #[test]
    fn missing_stack_is_created() {
        let intent = StackIntent::new("db", "services: {}");
        assert_eq!(determine_action(&intent, &stacks()), ReconcileAction::Create);
    }

    #[test]
    fn missing_stack_is_created_even_with_delete_flag() {
        let intent = StackIntent::new("db", "services: {}").with_delete(true);
        assert_eq!(determine_action(&intent, &stacks()), ReconcileAction::Create);
    }

    #[test]
    fn empty_listing_means_create() {
        let intent = StackIntent::new("web", "services: {}");
        assert_eq!(determine_action(&intent, &[]), ReconcileAction::Create);
    }

    #[test]
    fn existing_stack_is_updated() {
        let intent = StackIntent::new("web", "services: {}")
            .with_prune(true)
            .with_pull_image(true);
        assert_eq!(
            determine_action(&intent, &stacks()),
            ReconcileAction::Update { id: StackId::new(7) }
        );
    }

    #[test]
    fn existing_stack_is_deleted_regardless_of_update_options() {
        for (prune, pull_image) in [(false, false), (true, false), (false, true), (true, true)] {
            let intent = StackIntent::new("web", "")
                .with_delete(true)
                .with_prune(prune)
                .with_pull_image(pull_image);
            assert_eq!(
                determine_action(&intent, &stacks()),
                ReconcileAction::Delete { id: StackId::new(7) }
            );
        }
    }

    #[test]
    fn name_match_is_case_sensitive() {
        let intent = StackIntent::new("Web", "services: {}");
        assert_eq!(determine_action(&intent, &stacks()), ReconcileAction::Create);
    }

    #[test]
    fn name_match_is_exact() {
        let intent = StackIntent::new("we", "services: {}");
        assert_eq!(determine_action(&intent, &stacks()), ReconcileAction::Create);
    }

    #[test]
    fn first_duplicate_wins() {
        let listing = vec![RemoteStack::new(9, "web"), RemoteStack::new(4, "web")];
        assert_eq!(find_stack(&listing, "web").map(|s| s.id), Some(StackId::new(9)));
    }

    #[test]
    fn action_display() {
        assert_eq!(ReconcileAction::Create.to_string(), "create");
        assert_eq!(
            ReconcileAction::Delete { id: StackId::new(7) }.to_string(),
            "delete stack 7"
        );
    }
}
