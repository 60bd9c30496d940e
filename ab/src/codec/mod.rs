//! Payload codecs
//!
//! Acknowledgments arrive wrapped in a MessagePack envelope whose `message`
//! field carries the human-readable text. Status replies are JSON objects with a
//! `service-status` field. Both are reached through traits so the dispatcher can
//! be exercised with alternative encodings.

mod envelope;
mod error;
mod status;

pub use envelope::{EnvelopeCodec, MsgpackEnvelope};
pub use error::CodecError;
pub use status::{JsonStatusCodec, SERVICE_STATUS_FIELD, StatusCodec};
