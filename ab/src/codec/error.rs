//! Codec error types

use thiserror::Error;

/// Errors from decoding or encoding payloads
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode msgpack envelope: {0}")]
    EnvelopeDecode(#[from] rmp_serde::decode::Error),

    #[error("Failed to encode msgpack envelope: {0}")]
    EnvelopeEncode(#[from] rmp_serde::encode::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Field '{0}' not found in payload")]
    MissingField(&'static str),

    #[error("Field '{0}' is empty or not a string")]
    EmptyField(&'static str),
}
