//! Transport-agnostic domain types.

mod credentials;
mod id;
mod stack;

pub use credentials::{Credentials, Session};
pub use id::{ClusterId, EnvironmentId, StackId};
pub use stack::{RemoteStack, StackIntent, UpdateOptions};
