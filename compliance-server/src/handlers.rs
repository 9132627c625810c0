//! HTTP request handlers

use crate::api::{
    CreateTemplateRequest, CreateVersionRequest, DebugParams, EvaluationDiagnostics,
    EvaluationResponse, HealthResponse, HealthStatus, IngestTransactionRequest,
    ListAlertsParams, ReadinessResponse, TransitionAlertRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use compliance_core::alerts::AlertService;
use compliance_core::pipeline::ingest_and_evaluate;
use compliance_core::rules::template::RuleTemplateService;
use compliance_core::rules::version::RuleVersionService;
use compliance_core::types::{AlertId, OrganizationId, RuleTemplateId, RuleVersionId};
use std::time::Instant;
use tracing::{info, warn};

/// Ingest a transaction and evaluate it against the organization's active
/// rules (spec §4.10).
#[tracing::instrument(
    name = "ingest_transaction",
    skip(state, req),
    fields(
        organization_id = %org,
        account_id = %req.account_id,
        decision = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    )
)]
pub async fn ingest_transaction(
    State(state): State<AppState>,
    Path(org): Path<OrganizationId>,
    Query(params): Query<DebugParams>,
    Json(req): Json<IngestTransactionRequest>,
) -> ApiResult<Json<EvaluationResponse>> {
    let start = Instant::now();
    let transaction = req.into_transaction(org);

    let ctx = state.evaluation_context();
    let result = ingest_and_evaluate(&ctx, org, transaction).await?;

    let alerts = AlertService::new(ctx.uow.alerts())
        .list(org, Some(result.account_id))
        .await?
        .into_iter()
        .filter(|a| a.metadata.related_evaluation_result_ids.contains(&result.id))
        .collect::<Vec<_>>();

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    crate::tracing::record_decision(&result.decision.to_string(), elapsed_ms);
    metrics::record_ingestion(&result.decision.to_string(), elapsed_ms / 1000.0);

    let diagnostics = if state.debug || params.debug {
        Some(EvaluationDiagnostics {
            rules_evaluated: result.all_rule_results.len(),
            rules_triggered: result.triggered_rules.len(),
            all_rule_results: result.all_rule_results.clone(),
            evaluation_duration_ms: result.evaluation_duration_ms,
        })
    } else {
        None
    };

    info!(decision = %result.decision, latency_ms = elapsed_ms, "transaction evaluated");

    Ok(Json(EvaluationResponse { evaluation_result: result, alerts, diagnostics }))
}

/// Create a rule template (spec §4.4).
pub async fn create_template(
    State(state): State<AppState>,
    Path(org): Path<OrganizationId>,
    Json(req): Json<CreateTemplateRequest>,
) -> ApiResult<Json<compliance_core::rules::template::RuleTemplate>> {
    let service = RuleTemplateService::new(state.uow.templates(), state.uow.versions());
    let template = service.create(org, req.name, req.description, req.category).await?;
    Ok(Json(template))
}

/// List rule templates for an organization.
pub async fn list_templates(
    State(state): State<AppState>,
    Path(org): Path<OrganizationId>,
) -> ApiResult<Json<Vec<compliance_core::rules::template::RuleTemplate>>> {
    let service = RuleTemplateService::new(state.uow.templates(), state.uow.versions());
    Ok(Json(service.list(org).await?))
}

/// Get a single rule template.
pub async fn get_template(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, RuleTemplateId)>,
) -> ApiResult<Json<compliance_core::rules::template::RuleTemplate>> {
    let service = RuleTemplateService::new(state.uow.templates(), state.uow.versions());
    Ok(Json(service.get(org, id).await?))
}

/// Deactivate a rule template, cascading to its active version (spec §4.4).
pub async fn deactivate_template(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, RuleTemplateId)>,
) -> ApiResult<Json<compliance_core::rules::template::RuleTemplate>> {
    let service = RuleTemplateService::new(state.uow.templates(), state.uow.versions());
    Ok(Json(service.deactivate(org, id).await?))
}

/// Create a rule version, validating and inheritance-merging its
/// conditions (spec §4.5).
pub async fn create_version(
    State(state): State<AppState>,
    Path(org): Path<OrganizationId>,
    Json(req): Json<CreateVersionRequest>,
) -> ApiResult<Json<compliance_core::rules::version::RuleVersion>> {
    let service = RuleVersionService::new(state.uow.versions());
    let version = service
        .create(
            org,
            req.template_id,
            req.conditions,
            req.actions,
            req.priority,
            req.window,
            req.parent_version_id,
            req.created_by,
        )
        .await?;
    Ok(Json(version))
}

/// Activate a rule version, deactivating its template's previously active
/// version (spec §4.5 invariant: at most one active version per template).
pub async fn activate_version(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, RuleVersionId)>,
) -> ApiResult<Json<compliance_core::rules::version::RuleVersion>> {
    let service = RuleVersionService::new(state.uow.versions());
    let version = service.activate(org, id).await?;
    state.active_rules_cache.invalidate(org);
    Ok(Json(version))
}

/// Deactivate a rule version.
pub async fn deactivate_version(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, RuleVersionId)>,
) -> ApiResult<Json<compliance_core::rules::version::RuleVersion>> {
    let service = RuleVersionService::new(state.uow.versions());
    let version = service.deactivate(org, id).await?;
    state.active_rules_cache.invalidate(org);
    Ok(Json(version))
}

/// List alerts, optionally scoped to an account (spec §4.6).
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(org): Path<OrganizationId>,
    Query(params): Query<ListAlertsParams>,
) -> ApiResult<Json<Vec<compliance_core::alerts::Alert>>> {
    let service = AlertService::new(state.uow.alerts());
    Ok(Json(service.list(org, params.account_id).await?))
}

/// Get a single alert.
pub async fn get_alert(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, AlertId)>,
) -> ApiResult<Json<compliance_core::alerts::Alert>> {
    let service = AlertService::new(state.uow.alerts());
    Ok(Json(service.get(org, id).await?))
}

/// Transition an alert's status (spec §4.6 lifecycle).
pub async fn transition_alert(
    State(state): State<AppState>,
    Path((org, id)): Path<(OrganizationId, AlertId)>,
    Json(req): Json<TransitionAlertRequest>,
) -> ApiResult<Json<compliance_core::alerts::Alert>> {
    let service = AlertService::new(state.uow.alerts());
    Ok(Json(service.transition(org, id, req.status).await?))
}

/// Health check - liveness probe
pub async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Health check - readiness probe. Unlike liveness, readiness verifies
/// the persistence layer is actually reachable by listing templates for
/// a scratch organization id rather than trusting process uptime alone.
pub async fn health_ready(State(state): State<AppState>) -> ApiResult<Json<ReadinessResponse>> {
    match state.uow.templates().list_by_org(OrganizationId::new()).await {
        Ok(_) => Ok(Json(ReadinessResponse { status: HealthStatus::Healthy, database_reachable: true })),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            Err(ApiError::ServiceUnavailable("persistence layer not reachable".to_string()))
        }
    }
}

/// Prometheus metrics endpoint
pub async fn metrics_endpoint() -> String {
    metrics::get_prometheus_metrics()
}
