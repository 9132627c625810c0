//! API request and response types

use chrono::{DateTime, Utc};
use compliance_core::alerts::{Alert, AlertStatus};
use compliance_core::model::{ActionDefinition, EvaluationResult, RuleOutcome, Transaction};
use compliance_core::rules::template::RuleTemplate;
use compliance_core::rules::version::RuleVersion;
use compliance_core::types::{AccountId, OrganizationId, RuleTemplateId, RuleVersionId};
use compliance_core::window::WindowSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Request body for `POST /v1/organizations/{org}/transactions` (spec §4.10).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestTransactionRequest {
    pub account_id: AccountId,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: f64,
    pub currency: String,
    pub amount_normalized: Option<f64>,
    pub currency_normalized: Option<String>,
    pub datetime: DateTime<Utc>,
    pub country: Option<String>,
    pub counterparty_id: Option<String>,
    pub channel: Option<String>,
    pub subtype: Option<String>,
    pub quantity: Option<f64>,
    pub asset: Option<String>,
    pub price: Option<f64>,
    pub origin: Option<String>,
    #[serde(default)]
    pub data: Json,
    #[serde(default)]
    pub metadata: Json,
    pub created_by: Option<String>,
}

impl IngestTransactionRequest {
    pub fn into_transaction(self, organization_id: OrganizationId) -> Transaction {
        Transaction {
            id: compliance_core::types::TransactionId::new(),
            organization_id,
            account_id: self.account_id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            currency: self.currency,
            amount_normalized: self.amount_normalized,
            currency_normalized: self.currency_normalized,
            datetime: self.datetime,
            country: self.country,
            counterparty_id: self.counterparty_id,
            channel: self.channel,
            subtype: self.subtype,
            quantity: self.quantity,
            asset: self.asset,
            price: self.price,
            origin: self.origin,
            data: self.data,
            metadata: self.metadata,
            created_by: self.created_by,
        }
    }
}

/// Response body for a completed ingestion/evaluation (spec §6).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub evaluation_result: EvaluationResult,
    pub alerts: Vec<Alert>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<EvaluationDiagnostics>,
}

/// Debug-only diagnostics (spec §6 "debug query param / AppState.debug flag").
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDiagnostics {
    pub rules_evaluated: usize,
    pub rules_triggered: usize,
    pub all_rule_results: Vec<RuleOutcome>,
    pub evaluation_duration_ms: i64,
}

/// Request body for creating a rule template (spec §4.4).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Request body for creating a rule version (spec §4.5).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub template_id: RuleTemplateId,
    pub conditions: Json,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
    #[serde(default)]
    pub priority: i32,
    pub window: Option<WindowSpec>,
    pub parent_version_id: Option<RuleVersionId>,
    pub created_by: Option<String>,
}

/// Request body for `PATCH /v1/organizations/{org}/alerts/{id}` (spec §4.6 lifecycle).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionAlertRequest {
    pub status: AlertStatus,
}

/// `RuleTemplate` wrapped for list responses (no added fields today, kept
/// as a named response type so the wire shape can diverge from the core
/// model without a breaking change later).
pub type TemplateResponse = RuleTemplate;

/// `RuleVersion` wrapped for list responses.
pub type VersionResponse = RuleVersion;

/// Health check response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Readiness response (spec §6): whether the database is reachable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub database_reachable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Query parameters enabling diagnostics on the ingestion response, the
/// same `debug` toggle story the teacher's `AppState.debug` carries.
#[derive(Debug, Clone, Deserialize)]
pub struct DebugParams {
    #[serde(default)]
    pub debug: bool,
}

/// Query parameters for listing alerts scoped to an account.
#[derive(Debug, Clone, Deserialize)]
pub struct ListAlertsParams {
    pub account_id: Option<AccountId>,
}
