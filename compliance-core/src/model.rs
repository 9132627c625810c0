//! Core data model (spec §3): transactions, evaluation results, actions.

use crate::types::{AccountId, EvaluationResultId, OrganizationId, RuleVersionId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A financial event to evaluate. Created at ingestion, never updated by
/// the core afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier assigned at persistence time (the source of truth, spec §4.10 step 1).
    pub id: TransactionId,
    /// Tenancy scope.
    pub organization_id: OrganizationId,
    /// Account the transaction is attributed to.
    pub account_id: AccountId,
    /// Free-form transaction type (e.g. "CASH_OUT", "DEBIT").
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Raw amount as reported.
    pub amount: f64,
    /// ISO-4217-ish currency code (shape not validated by the core — spec §9 open question 3).
    pub currency: String,
    /// Amount converted to a common reporting currency, if available.
    pub amount_normalized: Option<f64>,
    /// Currency the normalized amount is expressed in.
    pub currency_normalized: Option<String>,
    /// Canonical event time. Evaluations and windows anchor to this, never
    /// to wall-clock (spec §3, §5).
    pub datetime: DateTime<Utc>,
    /// ISO country code associated with the transaction, if any.
    pub country: Option<String>,
    /// Counterparty identifier, if any.
    pub counterparty_id: Option<String>,
    /// Channel the transaction was initiated through (e.g. "MOBILE", "BRANCH").
    pub channel: Option<String>,
    /// Free-form subtype.
    pub subtype: Option<String>,
    /// Quantity, for asset-denominated transactions.
    pub quantity: Option<f64>,
    /// Asset identifier, for asset-denominated transactions.
    pub asset: Option<String>,
    /// Unit price, for asset-denominated transactions.
    pub price: Option<f64>,
    /// Origin system/channel that submitted the transaction.
    pub origin: Option<String>,
    /// Free-form payload carried alongside the structured fields.
    #[serde(default)]
    pub data: Json,
    /// Free-form metadata carried alongside the structured fields.
    #[serde(default)]
    pub metadata: Json,
    /// Who (or what) submitted the ingestion request, if known.
    pub created_by: Option<String>,
}

/// Which of a rule's conditions matched, recorded for audit (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleOutcome {
    /// The rule version this outcome belongs to.
    pub rule_version_id: RuleVersionId,
    /// The rule's priority at evaluation time.
    pub priority: i32,
    /// Whether the rule's conditions were satisfied.
    pub satisfied: bool,
}

/// The type of effect an [`ActionDefinition`] produces when its owning
/// rule is satisfied (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CreateAlert,
    BlockTransaction,
    Webhook,
    PublishQueue,
}

/// `{type, severity?, category?, message?, ...}` — an action attached to a
/// rule version (spec §3). Actions are recorded, never fired (spec §1
/// non-goals): a `webhook`/`publish_queue` action only ever contributes to
/// the `REVIEW` decision and is carried into the evaluation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// What kind of effect this action represents.
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Severity label, conventionally used by `create_alert` actions.
    pub severity: Option<String>,
    /// Category label, conventionally used by `create_alert` actions.
    pub category: Option<String>,
    /// Human-readable message template.
    pub message: Option<String>,
    /// Any additional action-specific fields (e.g. a webhook URL).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Json>,
}

/// Immutable audit record of one evaluation (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Identifier assigned at persistence time.
    pub id: EvaluationResultId,
    /// Tenancy scope.
    pub organization_id: OrganizationId,
    /// The transaction this result was computed for.
    pub transaction_id: TransactionId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// The reached decision.
    pub decision: crate::types::Decision,
    /// Rules whose conditions were satisfied.
    pub triggered_rules: Vec<RuleOutcome>,
    /// Every evaluated rule's outcome, satisfied or not.
    pub all_rule_results: Vec<RuleOutcome>,
    /// Actions flattened from every triggered rule, in rule-priority order.
    pub actions: Vec<ActionDefinition>,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,
    /// How long the evaluation took.
    pub evaluation_duration_ms: i64,
}
