//! Sequential reconciliation driver.
//!
//! ```text
//! Start → Authenticated → Listed → {Creating | Updating | Deleting} → Done
//!   └────────────┴───────────┴────────────────┴──────────→ Failed
//! ```
//!
//! Each remote call is awaited before the next one is issued. The first
//! error aborts the run; nothing is retried or rolled back.

use std::fmt;

use tracing::{debug, error, info};

use super::action::{determine_action, find_stack, ReconcileAction, ReconcileOutcome};
use crate::domain::{Credentials, EnvironmentId, RemoteStack, StackId, StackIntent};
use crate::error::Result;
use crate::port::{Progress, ProgressEvent, SilentProgress, StackApi, Step};

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Authenticated,
    Listed,
    Creating,
    Updating,
    Deleting,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Authenticated => "authenticated",
            Self::Listed => "listed",
            Self::Creating => "creating",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one stack towards its desired state through a [`StackApi`].
pub struct Reconciler<A> {
    api: A,
    progress: Box<dyn Progress>,
    phase: Phase,
    /// Step announced but not yet finished.
    open_step: Option<Step>,
}

impl<A: StackApi> Reconciler<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            progress: Box::new(SilentProgress),
            phase: Phase::Start,
            open_step: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_api(self) -> A {
        self.api
    }

    /// Authenticate, look the stack up and apply exactly one mutation.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any remote call; the phase is then
    /// [`Phase::Failed`].
    pub async fn run(
        &mut self,
        credentials: &Credentials,
        intent: &StackIntent,
    ) -> Result<ReconcileOutcome> {
        debug!(stack = %intent.name, content = %intent.file_content, "Stack content");

        let result = self.reconcile(credentials, intent).await;
        self.settle(&result);
        result
    }

    /// Authenticate and look the stack up, returning the action a real run
    /// would take without performing it.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by authentication or listing.
    pub async fn plan(
        &mut self,
        credentials: &Credentials,
        intent: &StackIntent,
    ) -> Result<ReconcileAction> {
        let result = self.survey(credentials, intent).await;
        self.settle(&result);
        result
    }

    async fn survey(
        &mut self,
        credentials: &Credentials,
        intent: &StackIntent,
    ) -> Result<ReconcileAction> {
        self.authenticate(credentials).await?;
        let stacks = self.retrieve(credentials.environment_id, &intent.name).await?;
        Ok(determine_action(intent, &stacks))
    }

    fn settle<T>(&mut self, result: &Result<T>) {
        match result {
            Ok(_) => self.phase = Phase::Done,
            Err(e) => {
                error!(phase = %self.phase, error = %e, "Reconciliation failed");
                if let Some(step) = self.open_step {
                    self.finish(step);
                }
                self.phase = Phase::Failed;
            }
        }
    }

    async fn reconcile(
        &mut self,
        credentials: &Credentials,
        intent: &StackIntent,
    ) -> Result<ReconcileOutcome> {
        let environment = credentials.environment_id;

        self.authenticate(credentials).await?;
        let stacks = self.retrieve(environment, &intent.name).await?;

        match determine_action(intent, &stacks) {
            ReconcileAction::Create => self.create(intent, environment).await,
            ReconcileAction::Update { id } => self.update(id, intent, environment).await,
            ReconcileAction::Delete { id } => self.delete(id, environment).await,
        }
    }

    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.begin(Step::Authentication);
        self.say("Authenticating to the Portainer API".to_string());

        self.api
            .authenticate(&credentials.username, &credentials.password)
            .await?;

        self.phase = Phase::Authenticated;
        info!(username = %credentials.username, "Authenticated");
        self.say("Authentication token retrieved".to_string());
        self.finish(Step::Authentication);
        Ok(())
    }

    async fn retrieve(
        &mut self,
        environment: EnvironmentId,
        name: &str,
    ) -> Result<Vec<RemoteStack>> {
        self.begin(Step::RetrieveStack);

        let stacks = self.api.list_stacks(environment).await?;
        self.phase = Phase::Listed;

        match find_stack(&stacks, name) {
            Some(stack) => {
                info!(stack = %name, id = %stack.id, "Stack found");
                self.say(format!("Stack '{name}' found (ID: {})", stack.id));
            }
            None => {
                info!(stack = %name, listed = stacks.len(), "Stack not found");
                self.say(format!("Stack '{name}' not found"));
            }
        }

        self.finish(Step::RetrieveStack);
        Ok(stacks)
    }

    async fn create(
        &mut self,
        intent: &StackIntent,
        environment: EnvironmentId,
    ) -> Result<ReconcileOutcome> {
        self.phase = Phase::Creating;
        self.begin(Step::Create);
        self.say(format!("Creating new stack '{}'", intent.name));

        let stack = self
            .api
            .create_stack(&intent.name, &intent.file_content, environment)
            .await?;

        info!(stack = %stack.name, id = %stack.id, "Stack created");
        self.say(format!("Stack '{}' created (ID: {})", stack.name, stack.id));
        self.finish(Step::Create);
        Ok(ReconcileOutcome::Created(stack))
    }

    async fn update(
        &mut self,
        id: StackId,
        intent: &StackIntent,
        environment: EnvironmentId,
    ) -> Result<ReconcileOutcome> {
        let options = intent.update_options;

        self.phase = Phase::Updating;
        self.begin(Step::Update);
        self.say(format!(
            "Updating stack {id} (prune: {}, pull image: {})",
            options.prune, options.pull_image
        ));

        let stack = self
            .api
            .update_stack(id, &intent.file_content, environment, options)
            .await?;

        info!(id = %id, prune = options.prune, pull_image = options.pull_image, "Stack updated");
        self.say(format!("Stack {id} updated"));
        self.finish(Step::Update);
        Ok(ReconcileOutcome::Updated(stack))
    }

    async fn delete(&mut self, id: StackId, environment: EnvironmentId) -> Result<ReconcileOutcome> {
        self.phase = Phase::Deleting;
        self.begin(Step::Delete);
        self.say(format!("Deleting stack {id}"));

        self.api.delete_stack(id, environment).await?;

        info!(id = %id, "Stack deleted");
        self.say(format!("Stack {id} deleted"));
        self.finish(Step::Delete);
        Ok(ReconcileOutcome::Deleted(id))
    }

    fn begin(&mut self, step: Step) {
        self.open_step = Some(step);
        self.progress.report(ProgressEvent::StepStarted(step));
    }

    fn finish(&mut self, step: Step) {
        self.open_step = None;
        self.progress.report(ProgressEvent::StepFinished(step));
    }

    fn say(&self, message: String) {
        self.progress.report(ProgressEvent::Message(message));
    }
}
