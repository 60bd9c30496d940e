//! Message transport
//!
//! The bridge publishes requests through a [`Transport`] and receives responses
//! through an [`InboundHandler`] the transport calls from its own task. Responses
//! are unsolicited: nothing ties a delivery to the send that caused it except
//! what the dispatcher can read from the message itself.
//!
//! [`SocketTransport`] is the bundled implementation: newline-delimited JSON
//! frames over a Unix domain socket to the local message router.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{InboundMessage, OutboundRequest};

mod frame;
mod socket;

pub use frame::Frame;
pub use socket::{DEFAULT_TIMEOUT, MAX_FRAME_SIZE, SocketTransport};

/// Errors reported by a transport on publish
///
/// The sender treats every variant as retryable.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport is not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to serialize frame: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Frame too large: {size} bytes")]
    FrameTooLarge { size: usize },

    #[error("Rejected by transport: {0}")]
    Rejected(String),
}

/// Publishes outbound requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand a request to the transport
    ///
    /// Success means the transport accepted the message, not that the peer
    /// processed it.
    async fn send(&self, request: &OutboundRequest) -> Result<(), TransportError>;
}

/// Receives every inbound message addressed to this process
///
/// Called from the transport's delivery task, concurrently with any caller.
pub trait InboundHandler: Send + Sync {
    fn on_inbound_message(&self, message: InboundMessage);
}
