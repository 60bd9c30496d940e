//! Inbound messages delivered by the transport

use tracing::debug;

/// The (service, application) pair a message claims to come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub service: String,
    pub application: String,
}

impl Provenance {
    /// Split a source address into service and application
    ///
    /// `mac:112233445566/parodus/service-status/aker` yields service `parodus`
    /// and application `service-status/aker`. Returns None when the address has
    /// no service segment.
    pub fn parse(source: &str) -> Option<Self> {
        let (_device, rest) = source.split_once('/')?;
        let (service, application) = rest.split_once('/').unwrap_or((rest, ""));
        if service.is_empty() {
            return None;
        }
        Some(Self {
            service: service.to_string(),
            application: application.to_string(),
        })
    }

    /// Exact, case-sensitive match on both parts
    pub fn is(&self, service: &str, application: &str) -> bool {
        self.service == service && self.application == application
    }
}

/// A response message handed over by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub source: String,
    pub destination: String,
    pub transaction_id: Option<String>,
    pub status: i32,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    /// Provenance derived from the source address
    pub fn provenance(&self) -> Option<Provenance> {
        let provenance = Provenance::parse(&self.source);
        debug!(source = %self.source, ?provenance, "InboundMessage::provenance: parsed");
        provenance
    }
}
