//! Backend error types.

use thiserror::Error;

/// Errors returned by an [`OrderBackend`](super::OrderBackend).
///
/// The client does not interpret why a request was rejected; `message` is
/// kept for logs only.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Order not found")]
    NotFound,

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Could not decode backend response: {0}")]
    Decode(String),

    #[error("Operation not supported by this backend")]
    Unsupported,

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// Conflict responses mean the order changed underneath the request.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Rejected { status: 409, .. })
    }
}
