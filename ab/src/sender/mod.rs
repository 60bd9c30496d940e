//! Bounded-retry sender
//!
//! Publishes a prepared request and retries transport failures with an
//! exponential backoff. The caller waits through the retries: success means the
//! transport accepted the request, not that the peer acted on it.

mod backoff;
mod error;
mod policy;

pub use backoff::BackoffSender;
pub use error::SendError;
pub use policy::{DEFAULT_MAX_ATTEMPTS, DEFAULT_UNIT, RetryPolicy};
