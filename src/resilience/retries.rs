//! Retry logic for upstream sends.
//!
//! # Behavior
//! - Every attempt resends the identical [`OutboundRequest`]
//! - A 2xx response ends the loop immediately
//! - A non-2xx response or transport failure consumes one retry
//! - Constant delay between attempts, no jitter or growth
//! - When the budget is gone the last response is returned unchanged

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::observability::metrics;
use crate::resilience::delay::Sleeper;
use crate::upstream::{OutboundRequest, Transport, TransportError, UpstreamResponse};

/// Sends outbound requests, retrying failed attempts after a fixed delay.
#[derive(Clone)]
pub struct Forwarder {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    delay: Duration,
}

impl fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forwarder")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Forwarder {
    pub fn new(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>, delay: Duration) -> Self {
        Self {
            transport,
            sleeper,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Performs `request`, retrying up to `retries_remaining` more times.
    ///
    /// Returns the first 2xx response, or whatever the last attempt produced
    /// once the budget reaches zero. A non-2xx final response is `Ok`; only a
    /// final transport failure is `Err`.
    pub async fn send_with_retry(
        &self,
        request: &OutboundRequest,
        mut retries_remaining: u32,
    ) -> Result<UpstreamResponse, TransportError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let outcome = self.transport.send(request).await;

            let succeeded = match &outcome {
                Ok(response) => {
                    metrics::record_attempt(if response.ok() { "success" } else { "failure" });
                    tracing::debug!(attempt, status = response.status, url = %request.url, "Upstream attempt finished");
                    response.ok()
                }
                Err(e) => {
                    metrics::record_attempt("error");
                    tracing::debug!(attempt, error = %e, url = %request.url, "Upstream attempt failed");
                    false
                }
            };
            if succeeded {
                return outcome;
            }

            if retries_remaining == 0 {
                tracing::warn!(attempts = attempt, "Upstream retry budget exhausted");
                return outcome;
            }

            match &outcome {
                Ok(response) => tracing::info!(
                    attempt,
                    status = response.status,
                    delay = ?self.delay,
                    retries_remaining,
                    "Retrying upstream request"
                ),
                Err(e) => tracing::info!(
                    attempt,
                    error = %e,
                    delay = ?self.delay,
                    retries_remaining,
                    "Retrying upstream request after transport error"
                ),
            }

            self.sleeper.sleep(self.delay).await;
            retries_remaining -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::delay::RecordingSleeper;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes and records every request it sees.
    #[derive(Default)]
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<UpstreamResponse, TransportError>>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<UpstreamResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                seen: Mutex::default(),
            })
        }

        fn seen(&self) -> Vec<OutboundRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: &OutboundRequest) -> Result<UpstreamResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(UpstreamResponse::new(500, "script exhausted")))
        }
    }

    fn forwarder(
        transport: Arc<ScriptedTransport>,
        sleeper: Arc<RecordingSleeper>,
    ) -> Forwarder {
        Forwarder::new(transport, sleeper, Duration::from_millis(1000))
    }

    fn request() -> OutboundRequest {
        OutboundRequest::post_json("https://upstream.test/send", r#"{"personalizations":[]}"#)
    }

    #[tokio::test]
    async fn test_first_success_is_returned_without_delay() {
        let transport = ScriptedTransport::new(vec![Ok(UpstreamResponse::new(202, "queued"))]);
        let sleeper = Arc::new(RecordingSleeper::new());

        let response = forwarder(transport.clone(), sleeper.clone())
            .send_with_retry(&request(), 4)
            .await
            .unwrap();

        assert_eq!(response, UpstreamResponse::new(202, "queued"));
        assert_eq!(transport.seen().len(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_last_failure_verbatim() {
        let transport = ScriptedTransport::new(
            (1..=5)
                .map(|i| Ok(UpstreamResponse::new(500 + i, format!("fail {i}"))))
                .collect(),
        );
        let sleeper = Arc::new(RecordingSleeper::new());

        let response = forwarder(transport.clone(), sleeper.clone())
            .send_with_retry(&request(), 4)
            .await
            .unwrap();

        assert_eq!(response, UpstreamResponse::new(505, "fail 5"));
        assert_eq!(transport.seen().len(), 5);
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(1000); 4]);
    }

    #[tokio::test]
    async fn test_success_on_third_attempt_stops_retrying() {
        let transport = ScriptedTransport::new(vec![
            Ok(UpstreamResponse::new(503, "busy")),
            Ok(UpstreamResponse::new(429, "slow down")),
            Ok(UpstreamResponse::new(200, "sent")),
            Ok(UpstreamResponse::new(500, "never reached")),
        ]);
        let sleeper = Arc::new(RecordingSleeper::new());

        let response = forwarder(transport.clone(), sleeper.clone())
            .send_with_retry(&request(), 4)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "sent");
        assert_eq!(transport.seen().len(), 3);
        assert_eq!(sleeper.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_budget_makes_one_attempt() {
        let transport = ScriptedTransport::new(vec![Ok(UpstreamResponse::new(400, "bad"))]);
        let sleeper = Arc::new(RecordingSleeper::new());

        let response = forwarder(transport.clone(), sleeper.clone())
            .send_with_retry(&request(), 0)
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(transport.seen().len(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_every_attempt_sends_identical_request() {
        let transport = ScriptedTransport::new(vec![
            Ok(UpstreamResponse::new(502, "")),
            Ok(UpstreamResponse::new(502, "")),
            Ok(UpstreamResponse::new(502, "")),
        ]);
        let sleeper = Arc::new(RecordingSleeper::new());
        let original = request();

        forwarder(transport.clone(), sleeper)
            .send_with_retry(&original, 2)
            .await
            .unwrap();

        let seen = transport.seen();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|r| *r == original));
    }

    #[tokio::test]
    async fn test_transport_errors_consume_budget() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Network("connection refused".into())),
            Ok(UpstreamResponse::new(200, "sent")),
        ]);
        let sleeper = Arc::new(RecordingSleeper::new());

        let response = forwarder(transport.clone(), sleeper.clone())
            .send_with_retry(&request(), 4)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.seen().len(), 2);
        assert_eq!(sleeper.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_final_transport_error_is_returned() {
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Timeout("t1".into())),
            Err(TransportError::Network("n2".into())),
        ]);
        let sleeper = Arc::new(RecordingSleeper::new());

        let err = forwarder(transport.clone(), sleeper)
            .send_with_retry(&request(), 1)
            .await
            .unwrap_err();

        assert_eq!(err, TransportError::Network("n2".into()));
        assert_eq!(transport.seen().len(), 2);
    }
}
