//! Outbound HITL webhook notifier (§6.4): POSTs an interrupt notification to
//! a configured URL whenever the HITL Controller suspends a plan.
//!
//! The fixed 50ms→200ms/3-attempt backoff schedule is new to this spec (the
//! teacher's `backoff_for_attempt` is a configurable multiplier off a base
//! delay, not this fixed schedule), but the "retry unless an injected
//! circuit-breaker is present" shape is the same resilience idiom as
//! `mofa-foundation/src/orchestration/provider.rs`'s `ServiceProvider`.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{instrument, warn};

use mofa_kernel::orchestration::traits::CommandNotifier;
use mofa_kernel::orchestration::types::ExecutionCheckpoint;
use mofa_kernel::workflow::policy::CircuitBreakerState;

/// §6.4: three attempts, delays doubling from 50ms to 200ms.
const BACKOFF_SCHEDULE_MS: [u64; 3] = [50, 100, 200];

pub struct WebhookNotifier {
    client: Client,
    url: String,
    breaker: Option<CircuitBreakerState>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder().timeout(Duration::from_secs(10)).build().expect("failed to build reqwest client"),
            url: url.into(),
            breaker: None,
        }
    }

    pub fn with_circuit_breaker(mut self, breaker: CircuitBreakerState) -> Self {
        self.breaker = Some(breaker);
        self
    }

    fn body(checkpoint: &ExecutionCheckpoint) -> serde_json::Value {
        json!({
            "type": "interrupt",
            "checkpoint_id": checkpoint.checkpoint_id,
            "request_id": checkpoint.request_id,
            "interrupt_point": checkpoint.interrupt_point,
            "decision": checkpoint.decision,
            "plan": checkpoint.plan,
            "current_step": checkpoint.current_step,
            "created_at": checkpoint.created_at,
            "expires_at": checkpoint.expires_at,
        })
    }

    async fn post_once(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-GoMind-Event", "hitl.interrupt")
            .header("X-GoMind-Checkpoint-ID", checkpoint.checkpoint_id.clone())
            .header("X-GoMind-Request-ID", checkpoint.request_id.clone())
            .json(&Self::body(checkpoint))
            .send()
            .await
            .map_err(|e| format!("webhook POST to {} failed: {e}", self.url))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("webhook POST to {} returned HTTP {}", self.url, response.status()))
        }
    }
}

#[async_trait::async_trait]
impl CommandNotifier for WebhookNotifier {
    #[instrument(skip(self, checkpoint), fields(checkpoint_id = %checkpoint.checkpoint_id))]
    async fn notify_interrupt(&self, checkpoint: &ExecutionCheckpoint) -> Result<(), String> {
        // An injected breaker replaces the built-in retry schedule entirely:
        // one attempt, gated by breaker state, same as the capability
        // service's primary-path check in `ServiceProvider`.
        if let Some(breaker) = &self.breaker {
            if breaker.is_open().await {
                return Err(format!("circuit breaker open for webhook {}", self.url));
            }
            return match self.post_once(checkpoint).await {
                Ok(()) => {
                    breaker.record_success().await;
                    Ok(())
                }
                Err(reason) => {
                    breaker.record_failure().await;
                    Err(reason)
                }
            };
        }

        let mut last_err = String::new();
        for (attempt, delay_ms) in BACKOFF_SCHEDULE_MS.iter().enumerate() {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
            }
            match self.post_once(checkpoint).await {
                Ok(()) => return Ok(()),
                Err(reason) => {
                    warn!(attempt, error = %reason, "hitl webhook delivery attempt failed");
                    last_err = reason;
                }
            }
        }
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofa_kernel::orchestration::types::{CheckpointStatus, DecisionPayload, InterruptPoint, RequestMode, RoutingPlan};

    fn checkpoint() -> ExecutionCheckpoint {
        ExecutionCheckpoint {
            checkpoint_id: "cp-1".into(),
            request_id: "req-1".into(),
            status: CheckpointStatus::Pending,
            interrupt_point: InterruptPoint::BeforeStep,
            plan: RoutingPlan::new("p1", "do a thing"),
            current_step: Some("s1".into()),
            decision: DecisionPayload::default(),
            created_at: 0,
            expires_at: 1000,
            request_mode: RequestMode::NonStreaming,
            user_context: Default::default(),
            original_request: "do a thing".into(),
        }
    }

    #[test]
    fn body_embeds_required_fields() {
        let body = WebhookNotifier::body(&checkpoint());
        assert_eq!(body["type"], "interrupt");
        assert_eq!(body["checkpoint_id"], "cp-1");
        assert_eq!(body["request_id"], "req-1");
        assert_eq!(body["current_step"], "s1");
    }

    #[tokio::test]
    async fn retries_exhaust_against_an_unreachable_url() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:1");
        let err = notifier.notify_interrupt(&checkpoint()).await.unwrap_err();
        assert!(err.contains("failed") || err.contains("HTTP"));
    }

    #[tokio::test]
    async fn open_breaker_short_circuits_without_a_network_call() {
        let breaker = CircuitBreakerState::new(1, Duration::from_secs(60));
        breaker.record_failure().await;
        let notifier = WebhookNotifier::new("http://127.0.0.1:1").with_circuit_breaker(breaker);
        let err = notifier.notify_interrupt(&checkpoint()).await.unwrap_err();
        assert!(err.contains("circuit breaker open"));
    }
}
