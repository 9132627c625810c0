//! Alert Aggregate & Alert Service (spec §4.6): dedup-key derivation, the
//! consolidation protocol run after every evaluation, and the alert
//! status state machine.

use crate::error::{ComplianceError, Result};
use crate::model::ActionDefinition;
use crate::repository::traits::AlertRepository;
use crate::rules::version::RuleVersion;
use crate::types::{AccountId, AlertId, EvaluationResultId, OrganizationId, RuleVersionId, TransactionId};
use crate::window::dedup_bucket_start_iso;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Open,
    Acknowledged,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    fn allowed_next(self) -> &'static [AlertStatus] {
        use AlertStatus::*;
        match self {
            Open => &[Acknowledged, Resolved, Dismissed],
            Acknowledged => &[Resolved, Dismissed],
            Resolved | Dismissed => &[],
        }
    }

    fn can_transition_to(self, next: AlertStatus) -> bool {
        self.allowed_next().contains(&next)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertStatus::Open => "OPEN",
            AlertStatus::Acknowledged => "ACKNOWLEDGED",
            AlertStatus::Resolved => "RESOLVED",
            AlertStatus::Dismissed => "DISMISSED",
        };
        write!(f, "{s}")
    }
}

/// A deduplicated alert: one row per `(account, rule_version, window
/// bucket)` triple, consolidating every evaluation that re-triggers the
/// same rule in the same bucket (spec §4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub organization_id: OrganizationId,
    pub account_id: AccountId,
    pub rule_version_id: RuleVersionId,
    /// The transaction whose evaluation first created this alert.
    pub transaction_id: TransactionId,
    /// The evaluation result that first created this alert.
    pub evaluation_result_id: EvaluationResultId,
    /// ISO-8601 start of the dedup bucket this alert was raised for.
    pub window_start: String,
    /// `"{account_id}:{rule_version_id}:{window_start}"` (spec §4.6).
    pub dedup_key: String,
    pub status: AlertStatus,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
    /// Evaluations that re-triggered this alert after its first creation.
    pub suppressed_count: i64,
    pub metadata: AlertMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Consolidated trigger history carried on an [`Alert`] (spec §4.6 step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertMetadata {
    pub related_transaction_ids: Vec<TransactionId>,
    pub related_evaluation_result_ids: Vec<EvaluationResultId>,
    pub last_triggered_at: DateTime<Utc>,
    pub last_triggered_transaction_id: TransactionId,
    pub last_evaluation_result_id: EvaluationResultId,
}

impl Alert {
    pub fn dedup_key_for(account: AccountId, rule_version: RuleVersionId, window_start: &str) -> String {
        format!("{account}:{rule_version}:{window_start}")
    }
}

/// One triggered rule's `create_alert` action, carrying what the
/// consolidation protocol needs to derive a dedup key.
pub struct AlertCandidate<'a> {
    pub rule: &'a RuleVersion,
    pub action: &'a ActionDefinition,
}

pub struct AlertService<'a> {
    repo: &'a dyn AlertRepository,
}

impl<'a> AlertService<'a> {
    pub fn new(repo: &'a dyn AlertRepository) -> Self {
        Self { repo }
    }

    /// Consolidate every `create_alert` candidate from one evaluation
    /// (spec §4.6): batch-lookup existing alerts by dedup key, suppress
    /// into the existing row once per triggered rule when found, else
    /// create a new alert. Returns every alert touched (created or
    /// suppressed-into), in candidate order.
    #[allow(clippy::too_many_arguments)]
    pub async fn consolidate(
        &self,
        org: OrganizationId,
        account: AccountId,
        transaction_id: TransactionId,
        transaction_datetime: DateTime<Utc>,
        evaluation_result_id: EvaluationResultId,
        candidates: &[AlertCandidate<'_>],
    ) -> Result<Vec<Alert>> {
        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let keyed: Vec<(String, &AlertCandidate)> = candidates
            .iter()
            .map(|c| {
                let window_start = dedup_bucket_start_iso(transaction_datetime, c.rule.window);
                (Alert::dedup_key_for(account, c.rule.id, &window_start), c)
            })
            .collect();

        let keys: Vec<String> = keyed.iter().map(|(k, _)| k.clone()).collect();
        let existing = self.repo.find_by_dedup_keys(org, &keys).await?;
        let mut existing_by_key: std::collections::HashMap<String, Alert> =
            existing.into_iter().map(|a| (a.dedup_key.clone(), a)).collect();

        let mut touched = Vec::with_capacity(keyed.len());
        let mut created = 0u64;
        let mut suppressed = 0u64;
        for (dedup_key, candidate) in keyed {
            if let Some(mut alert) = existing_by_key.remove(&dedup_key) {
                let now = Utc::now();
                alert.suppressed_count += 1;
                alert.metadata.related_transaction_ids.push(transaction_id);
                alert.metadata.related_evaluation_result_ids.push(evaluation_result_id);
                alert.metadata.last_triggered_at = now;
                alert.metadata.last_triggered_transaction_id = transaction_id;
                alert.metadata.last_evaluation_result_id = evaluation_result_id;
                alert.updated_at = now;
                touched.push(self.repo.update(alert).await?);
                suppressed += 1;
            } else {
                let window_start = dedup_bucket_start_iso(transaction_datetime, candidate.rule.window);
                let now = Utc::now();
                let alert = Alert {
                    id: AlertId::new(),
                    organization_id: org,
                    account_id: account,
                    rule_version_id: candidate.rule.id,
                    transaction_id,
                    evaluation_result_id,
                    window_start,
                    dedup_key,
                    status: AlertStatus::Open,
                    severity: candidate.action.severity.clone(),
                    category: candidate.action.category.clone(),
                    message: candidate.action.message.clone(),
                    suppressed_count: 0,
                    metadata: AlertMetadata {
                        related_transaction_ids: vec![transaction_id],
                        related_evaluation_result_ids: vec![evaluation_result_id],
                        last_triggered_at: now,
                        last_triggered_transaction_id: transaction_id,
                        last_evaluation_result_id: evaluation_result_id,
                    },
                    created_at: now,
                    updated_at: now,
                    resolved_at: None,
                };
                touched.push(self.repo.insert(alert).await?);
                created += 1;
            }
        }
        if created > 0 {
            metrics::counter!("compliance_alerts_created_total").increment(created);
        }
        if suppressed > 0 {
            metrics::counter!("compliance_alerts_suppressed_total").increment(suppressed);
        }
        Ok(touched)
    }

    pub async fn get(&self, org: OrganizationId, id: AlertId) -> Result<Alert> {
        self.repo.get(org, id).await?.ok_or_else(|| ComplianceError::not_found("alert", id.to_string()))
    }

    pub async fn list(&self, org: OrganizationId, account: Option<AccountId>) -> Result<Vec<Alert>> {
        self.repo.list_by_org(org, account).await
    }

    pub async fn transition(&self, org: OrganizationId, id: AlertId, next: AlertStatus) -> Result<Alert> {
        let mut alert = self.get(org, id).await?;
        if !alert.status.can_transition_to(next) {
            return Err(ComplianceError::InvalidState {
                current: alert.status.to_string(),
                attempted: next.to_string(),
                allowed: alert.status.allowed_next().iter().map(|s| s.to_string()).collect(),
            });
        }
        alert.status = next;
        alert.updated_at = Utc::now();
        if matches!(next, AlertStatus::Resolved | AlertStatus::Dismissed) {
            alert.resolved_at = Some(alert.updated_at);
        }
        self.repo.update(alert).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_can_transition_to_any_non_terminal_or_terminal_state() {
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Acknowledged));
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Resolved));
        assert!(AlertStatus::Open.can_transition_to(AlertStatus::Dismissed));
    }

    #[test]
    fn acknowledged_cannot_go_back_to_open() {
        assert!(!AlertStatus::Acknowledged.can_transition_to(AlertStatus::Open));
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        assert!(AlertStatus::Resolved.allowed_next().is_empty());
        assert!(AlertStatus::Dismissed.allowed_next().is_empty());
    }

    #[test]
    fn dedup_key_combines_account_rule_and_window() {
        let account = AccountId::new();
        let rule = RuleVersionId::new();
        let key = Alert::dedup_key_for(account, rule, "2026-02-13T00:00:00+00:00");
        assert_eq!(key, format!("{account}:{rule}:2026-02-13T00:00:00+00:00"));
    }
}
