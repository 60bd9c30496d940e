//! Acknowledgment tracking and notification formatting
//!
//! Update and delete requests do not wait for their acknowledgment. The ids of
//! the most recent request are recorded in an [`AckContext`] so the
//! acknowledgment, whenever it arrives, can be reported against them.
//!
//! The context holds a single record and the last writer wins. If a second
//! request is sent before the first is acknowledged, the first acknowledgment
//! is reported with the second request's ids. Callers are expected to keep at
//! most one update or delete outstanding.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Leading tag of every notification emitted for the peer
pub const NOTIFICATION_TAG: &str = "aker";

/// Ids of the most recently issued update or delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AckRecord {
    pub transaction_id: u16,
    pub doc_version: u32,
}

/// Last-writer-wins holder for the outstanding request's ids
#[derive(Debug, Default)]
pub struct AckContext {
    last: Mutex<AckRecord>,
}

impl AckContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the recorded ids
    pub fn record(&self, transaction_id: u16, doc_version: u32) {
        debug!(transaction_id, doc_version, "AckContext::record: called");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = AckRecord {
            transaction_id,
            doc_version,
        };
    }

    /// Ids of the most recent request, zeros if none was recorded
    pub fn last(&self) -> AckRecord {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How the peer answered an update or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Acknowledged,
    Rejected,
}

impl AckOutcome {
    /// Map a response status code; unrecognized codes yield None
    pub fn from_status(status: i32) -> Option<Self> {
        match status {
            200 | 201 => Some(Self::Acknowledged),
            534 | 535 => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A notification ready to hand to the sink
///
/// Renders as `aker,{trans},{version},ACK,0` or
/// `aker,{trans},{version},NACK,0,aker,{status},{message}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckNotification {
    pub outcome: AckOutcome,
    pub record: AckRecord,
    pub status: i32,
    pub message: String,
}

impl AckNotification {
    /// Build a notification for `status`, or None if the code is not recognized
    pub fn new(status: i32, record: AckRecord, message: impl Into<String>) -> Option<Self> {
        let outcome = AckOutcome::from_status(status)?;
        Some(Self {
            outcome,
            record,
            status,
            message: message.into(),
        })
    }
}

impl fmt::Display for AckNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let AckRecord {
            transaction_id,
            doc_version,
        } = self.record;
        match self.outcome {
            AckOutcome::Acknowledged => {
                write!(f, "{},{},{},ACK,0", NOTIFICATION_TAG, transaction_id, doc_version)
            }
            AckOutcome::Rejected => write!(
                f,
                "{},{},{},NACK,0,{},{},{}",
                NOTIFICATION_TAG, transaction_id, doc_version, NOTIFICATION_TAG, self.status, self.message
            ),
        }
    }
}
