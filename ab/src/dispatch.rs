//! ResponseDispatcher - routes inbound messages by provenance
//!
//! - Acknowledgments from `aker/schedule` are unwrapped from their envelope,
//!   mapped by status code, and emitted as notifications.
//! - Status replies from `parodus/service-status/aker` are parsed for the
//!   reported status, which is published to the rendezvous.
//! - Anything else is ignored.
//!
//! Nothing here fails outward: decode problems are logged and the message is
//! dropped.

use std::sync::Arc;

use tracing::{debug, error, info, trace, warn};

use crate::ack::{AckContext, AckNotification};
use crate::codec::{EnvelopeCodec, JsonStatusCodec, MsgpackEnvelope, StatusCodec};
use crate::domain::{ACK_APPLICATION, ACK_SERVICE, InboundMessage, STATUS_APPLICATION, STATUS_SERVICE};
use crate::notify::NotificationSink;
use crate::rendezvous::Rendezvous;
use crate::transport::InboundHandler;

/// Inbound message handler feeding the rendezvous and the notification sink
pub struct ResponseDispatcher {
    rendezvous: Arc<Rendezvous>,
    acks: Arc<AckContext>,
    sink: Arc<dyn NotificationSink>,
    envelope: Box<dyn EnvelopeCodec>,
    status: Box<dyn StatusCodec>,
}

impl ResponseDispatcher {
    /// Create a dispatcher using the MessagePack envelope and JSON status codecs
    pub fn new(rendezvous: Arc<Rendezvous>, acks: Arc<AckContext>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            rendezvous,
            acks,
            sink,
            envelope: Box::new(MsgpackEnvelope),
            status: Box::new(JsonStatusCodec),
        }
    }

    /// Replace the payload codecs
    pub fn with_codecs(mut self, envelope: Box<dyn EnvelopeCodec>, status: Box<dyn StatusCodec>) -> Self {
        self.envelope = envelope;
        self.status = status;
        self
    }

    fn handle_ack(&self, message: InboundMessage) {
        info!(status = message.status, "Acknowledgment received from {}", ACK_SERVICE);
        let text = match self.envelope.decode(&message.payload) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to decode acknowledgment payload");
                return;
            }
        };
        debug!(%text, status = message.status, "handle_ack: decoded payload");

        let record = self.acks.last();
        match AckNotification::new(message.status, record, text) {
            Some(notification) => {
                let event = notification.to_string();
                debug!(%event, "handle_ack: emitting notification");
                self.sink.emit(&event);
            }
            None => warn!(status = message.status, "Invalid acknowledgment status code"),
        }
    }

    fn handle_status_reply(&self, message: InboundMessage) {
        debug!(transaction_id = ?message.transaction_id, "Status reply received from {}", STATUS_SERVICE);
        match self.status.service_status(&message.payload) {
            Ok(status) => {
                debug!(%status, "handle_status_reply: publishing service status");
                self.rendezvous.publish(status);
            }
            Err(e) => error!(error = %e, "Failed to get service status from payload"),
        }
    }
}

impl InboundHandler for ResponseDispatcher {
    fn on_inbound_message(&self, message: InboundMessage) {
        let Some(provenance) = message.provenance() else {
            trace!(source = %message.source, "on_inbound_message: no provenance, ignoring");
            return;
        };

        if provenance.is(ACK_SERVICE, ACK_APPLICATION) {
            self.handle_ack(message);
        } else if provenance.is(STATUS_SERVICE, STATUS_APPLICATION) {
            self.handle_status_reply(message);
        } else {
            trace!(?provenance, "on_inbound_message: unrelated provenance, ignoring");
        }
    }
}
