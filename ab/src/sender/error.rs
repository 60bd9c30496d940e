//! Send error types

use thiserror::Error;

use crate::domain::{RequestError, RequestKind};
use crate::transport::TransportError;

/// Errors from sending a request to the peer
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("{0} requests are not supported as managed requests")]
    UnsupportedKind(RequestKind),

    #[error("Unknown parameter name: {0}")]
    UnknownParameter(String),

    #[error("Giving up after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}

impl SendError {
    /// Whether the request reached the transport at all
    pub fn was_attempted(&self) -> bool {
        matches!(self, SendError::RetriesExhausted { .. })
    }
}
