//! Scripted in-memory stack API.
//!
//! Holds a list of stacks on a single swarm cluster and records every call
//! made against it. Failures are scripted per operation and fire once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{ClusterId, EnvironmentId, RemoteStack, Session, StackId, UpdateOptions};
use crate::error::{ApiError, Result};
use crate::port::StackApi;

/// Token handed out by a successful [`RecordingStackApi::authenticate`].
pub const TEST_TOKEN: &str = "test-token";

/// Operation kinds a failure can be scripted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Authenticate,
    ResolveCluster,
    ListStacks,
    CreateStack,
    UpdateStack,
    DeleteStack,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Authenticate {
        username: String,
    },
    ResolveCluster(EnvironmentId),
    ListStacks(EnvironmentId),
    CreateStack {
        name: String,
        file_content: String,
        environment: EnvironmentId,
    },
    UpdateStack {
        id: StackId,
        file_content: String,
        environment: EnvironmentId,
        options: UpdateOptions,
    },
    DeleteStack {
        id: StackId,
        environment: EnvironmentId,
    },
}

impl ApiCall {
    /// Whether this call changes remote state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateStack { .. } | Self::UpdateStack { .. } | Self::DeleteStack { .. }
        )
    }
}

struct State {
    cluster_id: ClusterId,
    stacks: Vec<RemoteStack>,
    next_id: i64,
    authenticated: bool,
    failures: HashMap<Operation, ApiError>,
    calls: Vec<ApiCall>,
}

/// In-memory [`StackApi`] for reconciler tests.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the reconciler.
#[derive(Clone)]
pub struct RecordingStackApi {
    state: Arc<Mutex<State>>,
}

impl Default for RecordingStackApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingStackApi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                cluster_id: ClusterId::from("swarm-test"),
                stacks: Vec::new(),
                next_id: 1,
                authenticated: false,
                failures: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Add an existing stack to the cluster.
    #[must_use]
    pub fn with_stack(self, id: i64, name: &str) -> Self {
        {
            let mut state = self.lock();
            state.stacks.push(RemoteStack::new(id, name));
            state.next_id = state.next_id.max(id + 1);
        }
        self
    }

    /// Make the next call to `operation` fail with `error`.
    #[must_use]
    pub fn failing(self, operation: Operation, error: ApiError) -> Self {
        self.lock().failures.insert(operation, error);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Calls that changed remote state.
    pub fn mutations(&self) -> Vec<ApiCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    /// Stacks currently on the cluster.
    pub fn stacks(&self) -> Vec<RemoteStack> {
        self.lock().stacks.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record `call`, then fail if a failure is scripted for `operation` or
    /// the caller has not authenticated yet.
    fn enter(&self, operation: Operation, call: ApiCall) -> Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some(error) = state.failures.remove(&operation) {
            return Err(error.into());
        }
        if operation != Operation::Authenticate && !state.authenticated {
            return Err(ApiError::Remote {
                operation: "request",
                status: Some(401),
                message: "Unauthorized".to_string(),
            }
            .into());
        }
        Ok(state)
    }
}

fn not_found(operation: &'static str, id: StackId) -> ApiError {
    ApiError::Remote {
        operation,
        status: Some(404),
        message: format!("Stack {id} not found"),
    }
}

#[async_trait]
impl StackApi for RecordingStackApi {
    async fn authenticate(&mut self, username: &str, _password: &str) -> Result<Session> {
        let mut state = self.enter(
            Operation::Authenticate,
            ApiCall::Authenticate {
                username: username.to_string(),
            },
        )?;
        state.authenticated = true;
        Ok(Session::new(TEST_TOKEN))
    }

    async fn resolve_cluster_id(&self, environment: EnvironmentId) -> Result<ClusterId> {
        let state = self.enter(Operation::ResolveCluster, ApiCall::ResolveCluster(environment))?;
        Ok(state.cluster_id.clone())
    }

    async fn list_stacks(&self, environment: EnvironmentId) -> Result<Vec<RemoteStack>> {
        self.resolve_cluster_id(environment).await?;
        let state = self.enter(Operation::ListStacks, ApiCall::ListStacks(environment))?;
        Ok(state.stacks.clone())
    }

    async fn create_stack(
        &self,
        name: &str,
        file_content: &str,
        environment: EnvironmentId,
    ) -> Result<RemoteStack> {
        self.resolve_cluster_id(environment).await?;
        let mut state = self.enter(
            Operation::CreateStack,
            ApiCall::CreateStack {
                name: name.to_string(),
                file_content: file_content.to_string(),
                environment,
            },
        )?;
        let stack = RemoteStack::new(state.next_id, name);
        state.next_id += 1;
        state.stacks.push(stack.clone());
        Ok(stack)
    }

    async fn update_stack(
        &self,
        id: StackId,
        file_content: &str,
        environment: EnvironmentId,
        options: UpdateOptions,
    ) -> Result<RemoteStack> {
        let state = self.enter(
            Operation::UpdateStack,
            ApiCall::UpdateStack {
                id,
                file_content: file_content.to_string(),
                environment,
                options,
            },
        )?;
        state
            .stacks
            .iter()
            .find(|stack| stack.id == id)
            .cloned()
            .ok_or_else(|| not_found("update stack", id).into())
    }

    async fn delete_stack(&self, id: StackId, environment: EnvironmentId) -> Result<()> {
        let mut state = self.enter(
            Operation::DeleteStack,
            ApiCall::DeleteStack { id, environment },
        )?;
        let before = state.stacks.len();
        state.stacks.retain(|stack| stack.id != id);
        if state.stacks.len() == before {
            return Err(not_found("delete stack", id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn requires_authentication_first() {
        let api = RecordingStackApi::new();
        let err = api.list_stacks(EnvironmentId::new(1)).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let mut api = RecordingStackApi::new().failing(
            Operation::Authenticate,
            ApiError::Authentication("bad password".into()),
        );
        assert!(api.authenticate("u", "p").await.is_err());
        assert!(api.authenticate("u", "p").await.is_ok());
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn create_assigns_fresh_id() {
        let mut api = RecordingStackApi::new().with_stack(4, "db");
        api.authenticate("u", "p").await.unwrap();
        let stack = api
            .create_stack("web", "services: {}", EnvironmentId::new(1))
            .await
            .unwrap();
        assert_eq!(stack.id, StackId::new(5));
        assert_eq!(api.stacks().len(), 2);
        assert_eq!(api.mutations().len(), 1);
    }
}
