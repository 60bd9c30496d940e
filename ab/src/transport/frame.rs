//! Wire frames for the socket transport
//!
//! Simple JSON-over-newline protocol. Each frame is a single line of JSON followed by `\n`.

use serde::{Deserialize, Serialize};

use crate::domain::{InboundMessage, OutboundRequest, RequestKind};

/// A single frame exchanged with the message router
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Frame {
    /// Request published by this process
    Request {
        kind: RequestKind,
        source: String,
        dest: String,
        transaction_uuid: String,
        content_type: String,
        payload: Option<Vec<u8>>,
    },

    /// Response delivered to this process
    Response {
        source: String,
        dest: String,
        #[serde(default)]
        transaction_uuid: Option<String>,
        status: i32,
        #[serde(default)]
        payload: Vec<u8>,
    },
}

impl Frame {
    /// Convert a response frame into an inbound message
    ///
    /// Request frames are not deliverable and yield None.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        match self {
            Frame::Response {
                source,
                dest,
                transaction_uuid,
                status,
                payload,
            } => Some(InboundMessage {
                source,
                destination: dest,
                transaction_id: transaction_uuid,
                status,
                payload,
            }),
            Frame::Request { .. } => None,
        }
    }
}

impl From<&OutboundRequest> for Frame {
    fn from(request: &OutboundRequest) -> Self {
        Frame::Request {
            kind: request.kind,
            source: request.source.clone(),
            dest: request.destination.clone(),
            transaction_uuid: request.transaction_id.clone(),
            content_type: request.content_type.clone(),
            payload: request.payload.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialize() {
        let request = OutboundRequest::new(RequestKind::Delete, "mac:1/webcfg", "mac:1/aker/schedule", "9");
        let json = serde_json::to_string(&Frame::from(&request)).unwrap();
        assert_eq!(
            json,
            r#"{"type":"Request","kind":"delete","source":"mac:1/webcfg","dest":"mac:1/aker/schedule","transaction_uuid":"9","content_type":"application/json","payload":null}"#
        );
    }

    #[test]
    fn test_response_deserialize_with_defaults() {
        let json = r#"{"type":"Response","source":"mac:1/aker/schedule","dest":"mac:1/webcfg","status":200}"#;
        let frame: Frame = serde_json::from_str(json).unwrap();
        let msg = frame.into_inbound().unwrap();
        assert_eq!(msg.status, 200);
        assert_eq!(msg.transaction_id, None);
        assert!(msg.payload.is_empty());
        assert_eq!(msg.destination, "mac:1/webcfg");
    }

    #[test]
    fn test_request_frame_not_deliverable() {
        let request = OutboundRequest::new(RequestKind::Retrieve, "a/b", "c/d", "x");
        assert_eq!(Frame::from(&request).into_inbound(), None);
    }
}
