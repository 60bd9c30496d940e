//! AkerBridge - the caller-facing side of the peer protocol
//!
//! Two operations:
//!
//! - [`AkerBridge::send_managed_request`] sends an update or delete and returns
//!   once the transport has accepted it. The acknowledgment arrives later as a
//!   notification through the [`ResponseDispatcher`](crate::dispatch::ResponseDispatcher).
//! - [`AkerBridge::check_status`] sends a status retrieve and waits, bounded by
//!   the status timeout, for the reply the dispatcher publishes to the shared
//!   [`Rendezvous`].
//!
//! Only one status check may be outstanding at a time. The rendezvous has a
//! single slot and replies carry nothing that ties them to a particular
//! request, so concurrent checks could take each other's answers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::ack::AckContext;
use crate::domain::{OutboundRequest, RequestKind, schedule_address, source_address, status_address};
use crate::identity::{DeviceIdentity, TransactionIds, UuidTransactionIds};
use crate::rendezvous::{DEFAULT_WAIT, Rendezvous, RendezvousError};
use crate::sender::{BackoffSender, RetryPolicy, SendError};
use crate::transport::Transport;

/// Status token the peer reports when it is up
pub const ONLINE_STATUS: &str = "online";

/// Outcome of a completed status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Online,
    /// The peer answered with something other than `online`
    NotOnline(String),
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::NotOnline(status) => write!(f, "not online ({})", status),
        }
    }
}

/// Errors from a status check
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("No service status received within {0:?}")]
    TimedOut(Duration),

    #[error("Service status reply was empty")]
    EmptyStatus,
}

impl From<RendezvousError> for StatusError {
    fn from(err: RendezvousError) -> Self {
        match err {
            RendezvousError::TimedOut(timeout) => StatusError::TimedOut(timeout),
        }
    }
}

/// Sends requests to the peer and correlates the status reply
pub struct AkerBridge {
    sender: BackoffSender,
    rendezvous: Arc<Rendezvous>,
    acks: Arc<AckContext>,
    identity: Arc<dyn DeviceIdentity>,
    ids: Arc<dyn TransactionIds>,
    status_timeout: Duration,
}

impl AkerBridge {
    /// Create a bridge sharing `rendezvous` and `acks` with the dispatcher
    /// registered on `transport`
    pub fn new(
        transport: Arc<dyn Transport>,
        identity: Arc<dyn DeviceIdentity>,
        rendezvous: Arc<Rendezvous>,
        acks: Arc<AckContext>,
    ) -> Self {
        Self {
            sender: BackoffSender::new(transport, RetryPolicy::default()),
            rendezvous,
            acks,
            identity,
            ids: Arc::new(UuidTransactionIds),
            status_timeout: DEFAULT_WAIT,
        }
    }

    /// Set the retry policy for all sends
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.sender = BackoffSender::new(self.sender_transport(), policy);
        self
    }

    /// Set how long a status check waits for its reply
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    /// Set the transaction id source used for status retrieves
    pub fn with_transaction_ids(mut self, ids: Arc<dyn TransactionIds>) -> Self {
        self.ids = ids;
        self
    }

    fn sender_transport(&self) -> Arc<dyn Transport> {
        self.sender.transport()
    }

    pub fn status_timeout(&self) -> Duration {
        self.status_timeout
    }

    pub fn policy(&self) -> RetryPolicy {
        self.sender.policy()
    }

    /// Send an update or delete to the peer's schedule service
    ///
    /// Records `transaction_id` and `version` as the ids the next
    /// acknowledgment is reported against, then sends with retry. The ids are
    /// recorded before any check, so a refused request still overwrites them.
    /// A delete never carries a payload; one passed in is dropped. Retrieve is
    /// not a managed request and is refused.
    pub async fn send_managed_request(
        &self,
        kind: RequestKind,
        payload: Option<Vec<u8>>,
        transaction_id: u16,
        version: u32,
    ) -> Result<(), SendError> {
        debug!(%kind, transaction_id, version, "send_managed_request: called");
        self.acks.record(transaction_id, version);
        self.send_recorded(kind, payload, transaction_id).await
    }

    async fn send_recorded(
        &self,
        kind: RequestKind,
        payload: Option<Vec<u8>>,
        transaction_id: u16,
    ) -> Result<(), SendError> {
        if kind == RequestKind::Retrieve {
            error!("Invalid request: retrieve is not supported as a managed request");
            return Err(SendError::UnsupportedKind(kind));
        }

        let device = self.identity.device_address();
        let mut request = OutboundRequest::new(
            kind,
            source_address(&device),
            schedule_address(&device),
            transaction_id.to_string(),
        );
        match (kind, payload) {
            (RequestKind::Update, Some(payload)) => request = request.with_payload(payload),
            (RequestKind::Delete, Some(payload)) => {
                debug!(len = payload.len(), "send_managed_request: dropping payload on delete");
            }
            _ => {}
        }

        self.sender.send(&request).await
    }

    /// Resolve a managed parameter name and send the matching request
    ///
    /// The ids are recorded even when the name is unknown.
    pub async fn send_param_request(
        &self,
        param_name: &str,
        payload: Option<Vec<u8>>,
        transaction_id: u16,
        version: u32,
    ) -> Result<(), SendError> {
        debug!(%param_name, transaction_id, version, "send_param_request: called");
        self.acks.record(transaction_id, version);
        let kind = RequestKind::from_param_name(param_name).ok_or_else(|| {
            error!(%param_name, "Invalid request: unknown parameter name");
            SendError::UnknownParameter(param_name.to_string())
        })?;
        self.send_recorded(kind, payload, transaction_id).await
    }

    /// Ask the peer whether it is online and wait for the answer
    ///
    /// A failed send does not end the check early: it still waits out the
    /// status timeout, so every check is bounded by send retries plus one wait.
    pub async fn check_status(&self) -> Result<ServiceStatus, StatusError> {
        debug!(timeout = ?self.status_timeout, "check_status: called");
        if let Some(stale) = self.rendezvous.discard() {
            warn!(%stale, "Discarded stale service status from an earlier check");
        }

        let device = self.identity.device_address();
        let transaction_id = self.ids.next_id();
        info!(%transaction_id, "Generated transaction id for status retrieve");
        let request = OutboundRequest::new(
            RequestKind::Retrieve,
            source_address(&device),
            status_address(&device),
            transaction_id,
        );

        match self.sender.send(&request).await {
            Ok(()) => info!("Sent status retrieve request"),
            Err(e) => error!(error = %e, "Failed to send status retrieve request"),
        }

        let status = self.rendezvous.await_and_consume(self.status_timeout).await.map_err(|e| {
            error!(error = %e, "Unable to get service status");
            StatusError::from(e)
        })?;

        if status.is_empty() {
            error!("Received empty service status");
            Err(StatusError::EmptyStatus)
        } else if status == ONLINE_STATUS {
            debug!(%status, "check_status: peer is online");
            Ok(ServiceStatus::Online)
        } else {
            error!(%status, "Received service status");
            Ok(ServiceStatus::NotOnline(status))
        }
    }
}
