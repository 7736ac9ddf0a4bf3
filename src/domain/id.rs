//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Portainer environment (endpoint) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(i64);

impl EnvironmentId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EnvironmentId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

/// Stack identifier assigned by Portainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackId(i64);

impl StackId {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StackId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

/// Swarm cluster identifier of an environment.
///
/// Docker reports swarm IDs as opaque strings, but the value is kept in
/// whatever JSON shape the API returned so it can be echoed back verbatim in
/// listing filters and creation payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterId {
    Numeric(i64),
    Text(String),
}

impl ClusterId {
    /// True when the identifier carries no usable value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Numeric(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for ClusterId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for ClusterId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_id_keeps_json_shape() {
        let text: ClusterId = serde_json::from_str(r#""jpofkc0i9uo9wtx1zesuk649w""#).unwrap();
        assert_eq!(text, ClusterId::from("jpofkc0i9uo9wtx1zesuk649w"));
        assert_eq!(
            serde_json::to_string(&text).unwrap(),
            r#""jpofkc0i9uo9wtx1zesuk649w""#
        );

        let numeric: ClusterId = serde_json::from_str("12").unwrap();
        assert_eq!(numeric, ClusterId::Numeric(12));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "12");
    }

    #[test]
    fn blank_cluster_id() {
        assert!(ClusterId::from("  ").is_blank());
        assert!(!ClusterId::from("abc").is_blank());
        assert!(!ClusterId::Numeric(0).is_blank());
    }

    #[test]
    fn ids_display_as_plain_integers() {
        assert_eq!(StackId::new(7).to_string(), "7");
        assert_eq!(EnvironmentId::from(2_i64).to_string(), "2");
        assert_eq!(serde_json::to_string(&StackId::new(7)).unwrap(), "7");
    }
}
