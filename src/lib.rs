//! Stackdeploy - reconcile a Portainer swarm stack from a CI pipeline.
//!
//! One run authenticates against the Portainer API, lists the stacks on the
//! target environment's swarm cluster and then performs exactly one
//! mutation: create the stack, update it, or delete it.
//!
//! # Architecture
//!
//! - [`domain`] - Identifiers, credentials and stack intent
//! - [`port`] - The [`StackApi`](port::StackApi) and [`Progress`](port::Progress) traits
//! - [`application`] - The reconciliation decision and driver
//! - [`adapter`] - Portainer HTTP client (outbound) and CLI (inbound)
//! - [`infrastructure`] - Configuration, logging and stack file templating
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use stackdeploy::adapter::outbound::portainer::PortainerClient;
//! use stackdeploy::application::reconcile::Reconciler;
//! use stackdeploy::domain::{Credentials, EnvironmentId, StackIntent};
//!
//! # async fn deploy() -> stackdeploy::error::Result<()> {
//! let credentials = Credentials {
//!     url: "https://portainer.example.com".parse()?,
//!     username: "deployer".into(),
//!     password: std::env::var("PORTAINER_PASSWORD").unwrap_or_default(),
//!     environment_id: EnvironmentId::new(2),
//! };
//! let intent = StackIntent::new("web", std::fs::read_to_string("stack.yml")?);
//!
//! let client = PortainerClient::new(&credentials.url)?;
//! let outcome = Reconciler::new(client).run(&credentials, &intent).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
