//! AkerBridge - schedule configuration bridge to the aker peer
//!
//! AkerBridge sends schedule updates and deletes to the `aker` service over a
//! local message bus, reports aker's acknowledgments as notifications, and asks
//! the router whether aker is online.
//!
//! # Core Concepts
//!
//! - **Fire and acknowledge later**: updates and deletes return once the
//!   transport accepts them; the acknowledgment arrives asynchronously
//! - **Bounded retry**: every send is retried with exponential backoff
//! - **Request/reply over a bus**: a status check waits on a single-slot
//!   rendezvous filled by the inbound dispatcher
//!
//! # Modules
//!
//! - [`bridge`] - The caller-facing operations
//! - [`dispatch`] - Routing of inbound messages
//! - [`sender`] - Bounded-retry publishing
//! - [`rendezvous`] - Reply handoff between delivery task and caller
//! - [`transport`] - Transport trait and Unix socket implementation
//! - [`codec`] - Payload codecs
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod ack;
pub mod bridge;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod identity;
pub mod notify;
pub mod rendezvous;
pub mod sender;
pub mod transport;

// Re-export commonly used types
pub use ack::{AckContext, AckNotification, AckOutcome, AckRecord};
pub use bridge::{AkerBridge, ONLINE_STATUS, ServiceStatus, StatusError};
pub use codec::{CodecError, EnvelopeCodec, JsonStatusCodec, MsgpackEnvelope, StatusCodec};
pub use config::Config;
pub use dispatch::ResponseDispatcher;
pub use domain::{InboundMessage, OutboundRequest, Provenance, RequestError, RequestKind};
pub use identity::{DeviceIdentity, StaticIdentity, TransactionIds, UuidTransactionIds};
pub use notify::{NotificationBus, NotificationSink};
pub use rendezvous::{Rendezvous, RendezvousError};
pub use sender::{BackoffSender, RetryPolicy, SendError};
pub use transport::{InboundHandler, SocketTransport, Transport, TransportError};
