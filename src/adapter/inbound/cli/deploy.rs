//! Handler for the `deploy` command.

use tracing::info;

use crate::adapter::inbound::cli::command::DeployArgs;
use crate::adapter::inbound::cli::config;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::progress::ConsoleProgress;
use crate::adapter::outbound::portainer::PortainerClient;
use crate::application::reconcile::{ReconcileOutcome, Reconciler};
use crate::error::Result;

/// Execute the deploy command.
pub async fn execute(args: &DeployArgs) -> Result<()> {
    let mut config = config::load(args.config.as_deref())?;
    args.apply_to(&mut config)?;
    config.validate()?;
    config.init_logging();

    let credentials = config.credentials()?;
    let intent = config.stack_intent()?;
    info!(
        url = %credentials.url,
        environment = %credentials.environment_id,
        stack = %intent.name,
        dry_run = args.dry_run,
        "Starting stack deployment"
    );

    let client = PortainerClient::from_config(&credentials.url, &config.portainer.http)?;
    let mut reconciler = Reconciler::new(client).with_progress(Box::new(ConsoleProgress));

    if args.dry_run {
        let action = reconciler.plan(&credentials, &intent).await?;
        output::success(&format!("Dry run for '{}': would {action}", intent.name));
        return Ok(());
    }

    let outcome = reconciler.run(&credentials, &intent).await?;
    output::success(&describe(&outcome));
    Ok(())
}

fn describe(outcome: &ReconcileOutcome) -> String {
    match outcome {
        ReconcileOutcome::Created(stack) => format!("Created stack {stack}"),
        ReconcileOutcome::Updated(stack) => format!("Updated stack {stack}"),
        ReconcileOutcome::Deleted(id) => format!("Deleted stack {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RemoteStack, StackId};

    #[test]
    fn describes_each_outcome() {
        let stack = RemoteStack::new(7, "web");
        assert!(describe(&ReconcileOutcome::Created(stack.clone())).starts_with("Created stack"));
        assert!(describe(&ReconcileOutcome::Updated(stack)).starts_with("Updated stack"));
        assert_eq!(
            describe(&ReconcileOutcome::Deleted(StackId::new(7))),
            "Deleted stack 7"
        );
    }
}
