//! Errors from the external boundaries.
//!
//! Neither error ever implies a tree change: results are only applied after
//! they have been parsed and validated.

use thiserror::Error;

use builder_core::{ImportError, TreeError};

/// Errors from an AI flow.
#[derive(Debug, Error)]
pub enum AiError {
    /// The generative backend failed or timed out.
    #[error("AI backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    #[error("AI response was empty")]
    EmptyResponse,

    /// A newer request superseded this one.
    #[error("AI response for request {ticket} arrived after request {latest}")]
    Stale { ticket: u64, latest: u64 },

    #[error("AI response is not a valid component tree: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors from publishing to a remote config store.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Server credentials are not configured")]
    MissingCredentials,

    #[error("Server credentials are invalid: {field} {reason}")]
    InvalidCredentials { field: &'static str, reason: String },

    #[error("Invalid config key '{0}': use letters, digits, '_' and '-'")]
    InvalidKey(String),

    #[error("Config store '{store}' failed: {message}")]
    Store { store: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored value is not a valid component tree: {0}")]
    Import(#[from] ImportError),
}
