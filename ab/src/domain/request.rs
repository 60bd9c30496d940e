//! Outbound request types
//!
//! A request is built per call, handed to the sender, and dropped once the
//! send has either succeeded or given up.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Content type stamped on every outbound request
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Parameter name that selects a schedule update
pub const UPDATE_PARAM: &str = "Device.DeviceInfo.X_RDKCENTRAL-COM_Aker.Update";

/// Parameter name that selects a schedule delete
pub const DELETE_PARAM: &str = "Device.DeviceInfo.X_RDKCENTRAL-COM_Aker.Delete";

/// The three request kinds the peer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Update,
    Delete,
    Retrieve,
}

impl RequestKind {
    /// Resolve a managed parameter name to its request kind
    ///
    /// Only update and delete are reachable by parameter name; retrieve is
    /// issued internally by the status check.
    pub fn from_param_name(name: &str) -> Option<Self> {
        debug!(%name, "RequestKind::from_param_name: called");
        match name {
            UPDATE_PARAM => Some(Self::Update),
            DELETE_PARAM => Some(Self::Delete),
            _ => None,
        }
    }

    /// Whether requests of this kind must carry a payload
    pub fn requires_payload(self) -> bool {
        matches!(self, Self::Update)
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Retrieve => write!(f, "retrieve"),
        }
    }
}

/// Reasons a request is refused before it reaches the transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request source address is empty")]
    EmptySource,

    #[error("Request destination address is empty")]
    EmptyDestination,

    #[error("{kind} request requires a non-empty payload")]
    MissingPayload { kind: RequestKind },

    #[error("{kind} request must not carry a payload")]
    UnexpectedPayload { kind: RequestKind },
}

/// A fully addressed request ready to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub kind: RequestKind,
    pub source: String,
    pub destination: String,
    pub transaction_id: String,
    pub content_type: String,
    pub payload: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Create a request without a payload
    pub fn new(
        kind: RequestKind,
        source: impl Into<String>,
        destination: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
            destination: destination.into(),
            transaction_id: transaction_id.into(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            payload: None,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Payload length in bytes, zero when absent
    pub fn payload_size(&self) -> usize {
        self.payload.as_ref().map_or(0, Vec::len)
    }

    /// Check the request is well-formed for its kind
    pub fn validate(&self) -> Result<(), RequestError> {
        debug!(kind = %self.kind, payload_size = self.payload_size(), "OutboundRequest::validate: called");
        if self.source.is_empty() {
            return Err(RequestError::EmptySource);
        }
        if self.destination.is_empty() {
            return Err(RequestError::EmptyDestination);
        }
        match (self.kind.requires_payload(), self.payload_size() > 0) {
            (true, false) => Err(RequestError::MissingPayload { kind: self.kind }),
            (false, true) => Err(RequestError::UnexpectedPayload { kind: self.kind }),
            _ => Ok(()),
        }
    }
}
