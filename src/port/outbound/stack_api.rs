//! Stack orchestration port.
//!
//! Describes the remote API the reconciler drives. The only production
//! implementation is the Portainer HTTP client; tests use an in-memory fake.

use async_trait::async_trait;

use crate::domain::{ClusterId, EnvironmentId, RemoteStack, Session, StackId, UpdateOptions};
use crate::error::Result;

/// Remote stack management API.
///
/// Calls are issued strictly one after another by the reconciler, so
/// implementations need no internal synchronization beyond what `&mut self`
/// already gives for [`authenticate`](Self::authenticate).
///
/// # Errors
///
/// Every method returns an [`ApiError`](crate::error::ApiError) wrapped in
/// [`Error::Api`](crate::error::Error::Api) when the remote call fails.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Exchange credentials for a session and keep it for later calls.
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<Session>;

    /// Resolve the swarm cluster identifier of an environment.
    async fn resolve_cluster_id(&self, environment: EnvironmentId) -> Result<ClusterId>;

    /// List every stack on the environment's swarm cluster.
    ///
    /// Stacks on other clusters reachable through the same endpoint are never
    /// returned.
    async fn list_stacks(&self, environment: EnvironmentId) -> Result<Vec<RemoteStack>>;

    /// Create a new swarm stack from a definition string.
    async fn create_stack(
        &self,
        name: &str,
        file_content: &str,
        environment: EnvironmentId,
    ) -> Result<RemoteStack>;

    /// Replace the full content of an existing stack.
    async fn update_stack(
        &self,
        id: StackId,
        file_content: &str,
        environment: EnvironmentId,
        options: UpdateOptions,
    ) -> Result<RemoteStack>;

    /// Remove a stack, including resources created outside Portainer.
    async fn delete_stack(&self, id: StackId, environment: EnvironmentId) -> Result<()>;
}
