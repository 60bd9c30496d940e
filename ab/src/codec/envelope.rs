//! MessagePack envelope codec

use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use super::CodecError;

/// Extracts the text message carried in a binary envelope
pub trait EnvelopeCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError>;
}

#[derive(Debug, Serialize)]
struct Envelope {
    message: String,
}

/// Only a map is an envelope; the derived impl would also take an array
impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvelopeVisitor;

        impl<'de> Visitor<'de> for EnvelopeVisitor {
            type Value = Envelope;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with a string `message` field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Envelope, A::Error> {
                let mut message = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "message" && message.is_none() {
                        message = Some(map.next_value::<String>()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                let message = message.ok_or_else(|| de::Error::missing_field("message"))?;
                Ok(Envelope { message })
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

/// Envelope encoded as a MessagePack map with a `message` string field
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackEnvelope;

impl MsgpackEnvelope {
    /// Wrap text in an envelope, the inverse of [`EnvelopeCodec::decode`]
    pub fn encode(message: &str) -> Result<Vec<u8>, CodecError> {
        let bytes = rmp_serde::to_vec_named(&Envelope {
            message: message.to_string(),
        })?;
        Ok(bytes)
    }
}

impl EnvelopeCodec for MsgpackEnvelope {
    fn decode(&self, bytes: &[u8]) -> Result<String, CodecError> {
        debug!(len = bytes.len(), "MsgpackEnvelope::decode: called");
        let envelope: Envelope = rmp_serde::from_slice(bytes)?;
        Ok(envelope.message)
    }
}
