//! Portainer wire formats.
//!
//! Field names follow the Portainer REST API, which mixes PascalCase
//! responses with camelCase request bodies.

use serde::{Deserialize, Serialize};

use crate::domain::{ClusterId, RemoteStack, StackId};

#[derive(Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    pub jwt: Option<String>,
}

/// Subset of the Docker swarm inspect payload Portainer proxies.
#[derive(Deserialize)]
pub(crate) struct SwarmResponse {
    #[serde(rename = "ID")]
    pub id: Option<ClusterId>,
}

/// Value of the `filters` query parameter on `GET /stacks`.
#[derive(Serialize)]
pub(crate) struct StackFilters<'a> {
    #[serde(rename = "SwarmID")]
    pub swarm_id: &'a ClusterId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PortainerStack {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
}

impl From<PortainerStack> for RemoteStack {
    fn from(stack: PortainerStack) -> Self {
        Self {
            id: StackId::new(stack.id),
            name: stack.name,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateStackRequest<'a> {
    pub from_app_template: bool,
    pub name: &'a str,
    pub stack_file_content: &'a str,
    #[serde(rename = "swarmID")]
    pub swarm_id: &'a ClusterId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateStackRequest<'a> {
    pub stack_file_content: &'a str,
    pub prune: bool,
    pub pull_image: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EndpointQuery {
    pub endpoint_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteQuery {
    pub external: bool,
    pub endpoint_id: i64,
}

/// Error body returned by Portainer on 4xx/5xx.
#[derive(Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: Option<String>,
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Combine message and details into one line, if either is present.
    pub fn describe(&self) -> Option<String> {
        let message = self.message.as_deref().map(str::trim).filter(|m| !m.is_empty());
        let details = self.details.as_deref().map(str::trim).filter(|d| !d.is_empty());
        match (message, details) {
            (Some(m), Some(d)) if m != d => Some(format!("{m} ({d})")),
            (Some(m), _) => Some(m.to_string()),
            (None, Some(d)) => Some(d.to_string()),
            (None, None) => None,
        }
    }
}
