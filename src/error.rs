//! Error types for the resolution engine.

use crate::types::{AgentId, ClientId, PolicyId, SiteId};
use thiserror::Error;

/// Errors surfaced by the store and directory ports.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("site not found: {0}")]
    SiteNotFound(SiteId),

    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    #[error("policy not found: {0}")]
    PolicyNotFound(PolicyId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Engine-level errors.
///
/// A missing policy level in the hierarchy is represented as `None`, never as
/// an error; only dangling references and backend failures surface here.
#[derive(Debug, Error)]
pub enum CascadeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("configuration error: {0}")]
    Config(String),
}
