//! Portainer REST API client.
//!
//! Translates [`StackApi`] calls into authenticated HTTP requests. The JWT
//! obtained from `/auth` is held by the client and attached as a bearer token
//! to every request built afterwards; before authentication the header is
//! simply omitted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use super::dto::{
    AuthRequest, AuthResponse, CreateStackRequest, DeleteQuery, EndpointQuery, ErrorResponse,
    PortainerStack, StackFilters, SwarmResponse, UpdateStackRequest,
};
use super::endpoint::api_base;
use super::settings::HttpConfig;
use crate::domain::{ClusterId, EnvironmentId, RemoteStack, Session, StackId, UpdateOptions};
use crate::error::{ApiError, ConfigError, Result};
use crate::port::StackApi;

/// Longest raw error body echoed back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for a single Portainer instance.
#[derive(Debug)]
pub struct PortainerClient {
    http: HttpClient,
    /// API root, always ending in `/`.
    base_url: Url,
    session: Option<Session>,
}

impl PortainerClient {
    /// Create a client with default transport settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an `http(s)` URL.
    pub fn new(url: &Url) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(),
            base_url: api_base(url)?,
            session: None,
        })
    }

    /// Create a client honouring configured transport timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not an `http(s)` URL or the HTTP client
    /// cannot be built.
    pub fn from_config(url: &Url, config: &HttpConfig) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = config.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(|e| ConfigError::InvalidValue {
            field: "http",
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url: api_base(url)?,
            session: None,
        })
    }

    /// API root all request paths are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Session obtained by the last successful [`StackApi::authenticate`].
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Start a request, attaching the bearer token when a session exists.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.session {
            Some(session) => builder.bearer_auth(session.token()),
            None => builder,
        }
    }

    /// Send a request and turn transport failures and non-2xx statuses into
    /// [`ApiError`]s.
    async fn send(
        operation: &'static str,
        request: RequestBuilder,
    ) -> std::result::Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Network { operation, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Remote {
            operation,
            status: Some(status.as_u16()),
            message: describe_error_body(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no details").to_string()),
        })
    }

    async fn read_json<T: DeserializeOwned>(
        operation: &'static str,
        response: Response,
    ) -> std::result::Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network { operation, source })?;

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Remote {
            operation,
            status: None,
            message: format!("malformed response body: {e}"),
        })
    }
}

/// Prefer Portainer's structured `{message, details}` body, then the raw text.
fn describe_error_body(body: &str) -> Option<String> {
    if let Some(description) = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.describe())
    {
        return Some(description);
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect())
}

fn authentication_failure(err: ApiError) -> ApiError {
    let reason = match err {
        ApiError::Remote {
            status: Some(status),
            message,
            ..
        } => format!("HTTP {status}: {message}"),
        ApiError::Remote { message, .. } => message,
        ApiError::Network { source, .. } => format!("auth endpoint unreachable: {source}"),
        other => other.to_string(),
    };
    ApiError::Authentication(reason)
}

fn resolution_failure(environment: EnvironmentId, err: ApiError) -> ApiError {
    ApiError::Resolution {
        environment,
        reason: err.to_string(),
    }
}

#[async_trait]
impl StackApi for PortainerClient {
    async fn authenticate(&mut self, username: &str, password: &str) -> Result<Session> {
        const OP: &str = "authenticate";

        let url = self.endpoint("auth")?;
        info!(url = %url, username, "Authenticating against Portainer");

        let request = self
            .http
            .post(url)
            .json(&AuthRequest { username, password });
        let response = Self::send(OP, request)
            .await
            .map_err(authentication_failure)?;
        let body: AuthResponse = Self::read_json(OP, response)
            .await
            .map_err(authentication_failure)?;

        let token = body
            .jwt
            .filter(|jwt| !jwt.is_empty())
            .ok_or_else(|| ApiError::Authentication("response did not contain a token".into()))?;

        let session = Session::new(token);
        self.session = Some(session.clone());
        debug!("Authentication token retrieved");
        Ok(session)
    }

    async fn resolve_cluster_id(&self, environment: EnvironmentId) -> Result<ClusterId> {
        const OP: &str = "resolve swarm cluster";

        let url = self.endpoint(&format!("endpoints/{environment}/docker/swarm"))?;
        let response = Self::send(OP, self.request(Method::GET, url))
            .await
            .map_err(|e| resolution_failure(environment, e))?;
        let body: SwarmResponse = Self::read_json(OP, response)
            .await
            .map_err(|e| resolution_failure(environment, e))?;

        let cluster_id = body
            .id
            .filter(|id| !id.is_blank())
            .ok_or_else(|| ApiError::Resolution {
                environment,
                reason: "environment is not part of a swarm cluster".into(),
            })?;

        debug!(environment = %environment, cluster_id = %cluster_id, "Resolved swarm cluster");
        Ok(cluster_id)
    }

    async fn list_stacks(&self, environment: EnvironmentId) -> Result<Vec<RemoteStack>> {
        const OP: &str = "list stacks";

        let cluster_id = self.resolve_cluster_id(environment).await?;
        let filters = serde_json::to_string(&StackFilters {
            swarm_id: &cluster_id,
        })?;

        let url = self.endpoint("stacks")?;
        let request = self
            .request(Method::GET, url)
            .query(&[("filters", filters.as_str())]);
        let response = Self::send(OP, request).await?;
        let stacks: Vec<PortainerStack> = Self::read_json(OP, response).await?;

        debug!(count = stacks.len(), cluster_id = %cluster_id, "Fetched stacks");
        Ok(stacks.into_iter().map(RemoteStack::from).collect())
    }

    async fn create_stack(
        &self,
        name: &str,
        file_content: &str,
        environment: EnvironmentId,
    ) -> Result<RemoteStack> {
        const OP: &str = "create stack";

        let cluster_id = self.resolve_cluster_id(environment).await?;
        let url = self.endpoint("stacks/create/swarm/string")?;
        let request = self
            .request(Method::POST, url)
            .query(&EndpointQuery {
                endpoint_id: environment.get(),
            })
            .json(&CreateStackRequest {
                from_app_template: false,
                name,
                stack_file_content: file_content,
                swarm_id: &cluster_id,
            });

        let response = Self::send(OP, request).await?;
        let stack: PortainerStack = Self::read_json(OP, response).await?;
        Ok(stack.into())
    }

    async fn update_stack(
        &self,
        id: StackId,
        file_content: &str,
        environment: EnvironmentId,
        options: UpdateOptions,
    ) -> Result<RemoteStack> {
        const OP: &str = "update stack";

        let url = self.endpoint(&format!("stacks/{id}"))?;
        let request = self
            .request(Method::PUT, url)
            .query(&EndpointQuery {
                endpoint_id: environment.get(),
            })
            .json(&UpdateStackRequest {
                stack_file_content: file_content,
                prune: options.prune,
                pull_image: options.pull_image,
            });

        let response = Self::send(OP, request).await?;
        let stack: PortainerStack = Self::read_json(OP, response).await?;
        Ok(stack.into())
    }

    async fn delete_stack(&self, id: StackId, environment: EnvironmentId) -> Result<()> {
        const OP: &str = "delete stack";

        let url = self.endpoint(&format!("stacks/{id}"))?;
        let request = self.request(Method::DELETE, url).query(&DeleteQuery {
            external: true,
            endpoint_id: environment.get(),
        });

        Self::send(OP, request).await?;
        Ok(())
    }
}
