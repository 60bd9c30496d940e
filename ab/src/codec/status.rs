//! JSON service-status codec

use serde_json::Value;
use tracing::debug;

use super::CodecError;

/// Name of the field carrying the reported status
pub const SERVICE_STATUS_FIELD: &str = "service-status";

/// Extracts the reported service status from a status reply payload
pub trait StatusCodec: Send + Sync {
    fn service_status(&self, payload: &[u8]) -> Result<String, CodecError>;
}

/// Status reply encoded as a JSON object, e.g. `{"service-status":"online"}`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStatusCodec;

impl StatusCodec for JsonStatusCodec {
    fn service_status(&self, payload: &[u8]) -> Result<String, CodecError> {
        debug!(len = payload.len(), "JsonStatusCodec::service_status: called");
        let json: Value = serde_json::from_slice(payload)?;
        let field = json
            .get(SERVICE_STATUS_FIELD)
            .ok_or(CodecError::MissingField(SERVICE_STATUS_FIELD))?;
        match field.as_str() {
            Some(status) if !status.is_empty() => Ok(status.to_string()),
            _ => Err(CodecError::EmptyField(SERVICE_STATUS_FIELD)),
        }
    }
}
