use thiserror::Error;

use crate::domain::EnvironmentId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to read stack file {path}: {source}")]
    ReadStackFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures talking to the Portainer API.
///
/// Every variant is fatal for the run; nothing is retried.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credentials rejected, auth endpoint unreachable or token missing.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The environment has no swarm cluster identifier.
    #[error("could not resolve swarm cluster for environment {environment}: {reason}")]
    Resolution {
        environment: EnvironmentId,
        reason: String,
    },

    /// Non-success response or malformed body.
    #[error("{operation} failed{}: {message}", .status.map(|s| format!(" with HTTP {s}")).unwrap_or_default())]
    Remote {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },

    /// Transport-level failure (DNS, refused connection, timeout).
    #[error("network error during {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// HTTP status carried by a remote rejection, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

/// Stack file template rendering errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed tag starting at byte {offset}")]
    UnclosedTag { offset: usize },

    #[error("section '{name}' is never closed")]
    UnclosedSection { name: String },

    #[error("closing tag '{found}' does not match open section '{expected}'")]
    MismatchedSection { expected: String, found: String },

    #[error("closing tag '{name}' has no open section")]
    UnexpectedClose { name: String },

    #[error("empty tag at byte {offset}")]
    EmptyTag { offset: usize },

    #[error("unsupported tag '{{{{{tag}}}}}'")]
    Unsupported { tag: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_message_includes_status() {
        let err = ApiError::Remote {
            operation: "update stack",
            status: Some(404),
            message: "Stack not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "update stack failed with HTTP 404: Stack not found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn remote_error_without_status_omits_it() {
        let err = ApiError::Remote {
            operation: "list stacks",
            status: None,
            message: "expected array".into(),
        };
        assert_eq!(err.to_string(), "list stacks failed: expected array");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn api_errors_are_transparent_at_top_level() {
        let err: Error = ApiError::Authentication("HTTP 401: Invalid credentials".into()).into();
        assert_eq!(
            err.to_string(),
            "authentication failed: HTTP 401: Invalid credentials"
        );
    }
}
