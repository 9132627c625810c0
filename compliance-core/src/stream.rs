//! Streaming hooks: best-effort post-commit fan-out, never on the
//! critical path of a commit (spec §4.10 step 8).

use crate::alerts::Alert;
use crate::model::EvaluationResult;
use crate::types::OrganizationId;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// One event published after a transaction's evaluation has committed.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Evaluation(EvaluationResult),
    Alert(Alert),
}

/// A sink events are published to after their transaction commits.
/// Implementations must not block meaningfully, and publication failures
/// are logged and swallowed by the caller — the evaluation itself has
/// already been durably committed by the time this runs.
#[async_trait]
pub trait StreamSink: Send + Sync {
    async fn emit_evaluation(&self, org: OrganizationId, result: &EvaluationResult);
    async fn emit_alert(&self, org: OrganizationId, alert: &Alert);
}

/// The default sink: drops everything. Used when no downstream consumer
/// is configured.
pub struct NullSink;

#[async_trait]
impl StreamSink for NullSink {
    async fn emit_evaluation(&self, _org: OrganizationId, _result: &EvaluationResult) {}
    async fn emit_alert(&self, _org: OrganizationId, _alert: &Alert) {}
}

/// Fans events out over a [`tokio::sync::broadcast`] channel per
/// organization — any number of in-process subscribers (e.g. a
/// per-org websocket room) can `subscribe()` without the publisher
/// knowing about them.
pub struct ChannelSink {
    sender: broadcast::Sender<(OrganizationId, StreamEvent)>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<(OrganizationId, StreamEvent)> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl StreamSink for ChannelSink {
    async fn emit_evaluation(&self, org: OrganizationId, result: &EvaluationResult) {
        // No subscribers is the common case and not an error.
        let _ = self.sender.send((org, StreamEvent::Evaluation(result.clone())));
    }

    async fn emit_alert(&self, org: OrganizationId, alert: &Alert) {
        let _ = self.sender.send((org, StreamEvent::Alert(alert.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, EvaluationResultId, TransactionId};
    use chrono::Utc;

    fn sample_result() -> EvaluationResult {
        EvaluationResult {
            id: EvaluationResultId::new(),
            organization_id: OrganizationId::new(),
            transaction_id: TransactionId::new(),
            account_id: AccountId::new(),
            decision: crate::types::Decision::Allow,
            triggered_rules: vec![],
            all_rule_results: vec![],
            actions: vec![],
            evaluated_at: Utc::now(),
            evaluation_duration_ms: 1,
        }
    }

    #[tokio::test]
    async fn channel_sink_delivers_evaluation_to_subscriber() {
        let sink = ChannelSink::new(16);
        let mut rx = sink.subscribe();
        let result = sample_result();
        let org = result.organization_id;
        sink.emit_evaluation(org, &result).await;
        let (received_org, event) = rx.recv().await.unwrap();
        assert_eq!(received_org, org);
        assert!(matches!(event, StreamEvent::Evaluation(r) if r.id == result.id));
    }

    #[tokio::test]
    async fn channel_sink_emit_with_no_subscribers_does_not_panic() {
        let sink = ChannelSink::new(16);
        sink.emit_evaluation(OrganizationId::new(), &sample_result()).await;
    }
}
