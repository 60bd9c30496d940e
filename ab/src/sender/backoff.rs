//! BackoffSender - publish with bounded exponential retry

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{RetryPolicy, SendError};
use crate::domain::OutboundRequest;
use crate::transport::Transport;

/// Sends requests through a transport, retrying failures per a [`RetryPolicy`]
#[derive(Clone)]
pub struct BackoffSender {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl BackoffSender {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Publish `request`, sleeping `policy.backoff(attempt)` after each failure
    ///
    /// Every transport error is retried. The sleep follows each failed attempt,
    /// the last one included, so a request that never goes through costs the
    /// full schedule before `RetriesExhausted` is returned.
    pub async fn send(&self, request: &OutboundRequest) -> Result<(), SendError> {
        debug!(
            kind = %request.kind,
            dest = %request.destination,
            transaction_id = %request.transaction_id,
            payload_size = request.payload_size(),
            "BackoffSender::send: called"
        );
        request.validate()?;

        let mut attempt = 0;
        loop {
            let err = match self.transport.send(request).await {
                Ok(()) => {
                    info!(kind = %request.kind, attempt, "Sent request to transport");
                    return Ok(());
                }
                Err(e) => e,
            };

            let backoff = self.policy.backoff(attempt);
            error!(kind = %request.kind, attempt, error = %err, "Failed to send request, retrying");
            warn!(backoff_secs = backoff.as_secs_f64(), "BackoffSender::send: backing off");
            tokio::time::sleep(backoff).await;

            attempt += 1;
            if attempt >= self.policy.max_attempts() {
                error!(kind = %request.kind, attempts = attempt, "Giving up on request");
                return Err(SendError::RetriesExhausted {
                    attempts: attempt,
                    source: err,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestError, RequestKind};
    use crate::transport::mock::MockTransport;
    use std::time::Duration;
    use tokio::time::Instant;

    fn delete_request() -> OutboundRequest {
        OutboundRequest::new(RequestKind::Delete, "mac:1/webcfg", "mac:1/aker/schedule", "5")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_first_try_does_not_sleep() {
        let transport = Arc::new(MockTransport::new());
        let sender = BackoffSender::new(transport.clone(), RetryPolicy::default());

        let start = Instant::now();
        sender.send(&delete_request()).await.unwrap();

        assert!(start.elapsed() < Duration::from_millis(1));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_two_failures() {
        let transport = Arc::new(MockTransport::failing_first(2));
        let sender = BackoffSender::new(transport.clone(), RetryPolicy::default());

        let start = Instant::now();
        sender.send(&delete_request()).await.unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10), "slept {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(11), "slept {:?}", elapsed);
        assert_eq!(transport.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let transport = Arc::new(MockTransport::always_failing());
        let sender = BackoffSender::new(transport.clone(), RetryPolicy::default());

        let start = Instant::now();
        let err = sender.send(&delete_request()).await.unwrap_err();

        assert!(matches!(err, SendError::RetriesExhausted { attempts: 4, .. }));
        assert_eq!(transport.attempts(), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(3 + 7 + 15 + 31), "slept {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(57), "slept {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy() {
        let transport = Arc::new(MockTransport::always_failing());
        let sender = BackoffSender::new(transport.clone(), RetryPolicy::new(1, Duration::from_secs(1)));

        let err = sender.send(&delete_request()).await.unwrap_err();
        assert!(matches!(err, SendError::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(transport.attempts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_transport() {
        let transport = Arc::new(MockTransport::new());
        let sender = BackoffSender::new(transport.clone(), RetryPolicy::default());

        let update = OutboundRequest::new(RequestKind::Update, "mac:1/webcfg", "mac:1/aker/schedule", "5");
        let err = sender.send(&update).await.unwrap_err();

        assert!(matches!(
            err,
            SendError::InvalidRequest(RequestError::MissingPayload {
                kind: RequestKind::Update
            })
        ));
        assert_eq!(transport.attempts(), 0);
    }
}
