//! Domain types for akerbridge
//!
//! Outbound requests built by the bridge, inbound messages delivered by the
//! transport, and the address scheme both sides agree on.

mod address;
mod message;
mod request;

pub use address::{
    ACK_APPLICATION, ACK_SERVICE, SELF_SERVICE, STATUS_APPLICATION, STATUS_SERVICE, schedule_address, source_address,
    status_address,
};
pub use message::{InboundMessage, Provenance};
pub use request::{CONTENT_TYPE_JSON, DELETE_PARAM, OutboundRequest, RequestError, RequestKind, UPDATE_PARAM};
