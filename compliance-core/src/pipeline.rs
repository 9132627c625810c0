//! Transaction Evaluation Service (spec §4.10): the impure orchestrator
//! wrapping persist → load-rules → build-facts → evaluate → persist-result
//! → alert-consolidation → commit → best-effort post-commit metrics and
//! streaming, all bounded by a per-request deadline (spec §5).

use crate::alerts::{AlertCandidate, AlertService};
use crate::cache::{ActiveRulesCache, ListFactsCache};
use crate::engine::evaluate_transaction;
use crate::error::{ComplianceError, Result};
use crate::facts::{build_aggregation_facts, build_fact_bundle, list_lookup_candidates};
use crate::lists::ComplianceListService;
use crate::model::{ActionType, EvaluationResult, Transaction};
use crate::repository::traits::UnitOfWork;
use crate::rules::selector::select_for_evaluation;
use crate::rules::version::RuleVersion;
use crate::stream::StreamSink;
use crate::types::{EvaluationResultId, OrganizationId};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Everything a single `ingest_and_evaluate` call needs besides the
/// transaction payload itself.
pub struct EvaluationContext<'a> {
    pub uow: &'a dyn UnitOfWork,
    pub active_rules_cache: &'a ActiveRulesCache,
    pub list_facts_cache: Option<&'a ListFactsCache>,
    pub stream: &'a dyn StreamSink,
    pub behavioral_lookback_days: i64,
    pub cold_start_threshold: i64,
    pub evaluation_deadline: Duration,
}

/// Ingest `transaction`, evaluate it against the org's active rules, and
/// return the durable [`EvaluationResult`]. Cancellation/timeout applies
/// only to the evaluation computation (fact-building + rule evaluation)
/// — the ingestion persist and result persist are never interrupted
/// mid-write (spec §5).
#[instrument(skip(ctx, transaction), fields(organization_id = %org, account_id = %transaction.account_id))]
pub async fn ingest_and_evaluate(
    ctx: &EvaluationContext<'_>,
    org: OrganizationId,
    transaction: Transaction,
) -> Result<EvaluationResult> {
    let started = std::time::Instant::now();
    let transaction = ctx.uow.transactions().insert(transaction).await?;

    let active_versions = load_active_rules(ctx, org).await?;
    let selected = select_for_evaluation(&active_versions);

    let compute = compute_decision(ctx, org, &transaction, &selected);
    let (facts_json, engine_output) = match tokio::time::timeout(ctx.evaluation_deadline, compute).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(ComplianceError::business_rule(
                "EVALUATION_DEADLINE_EXCEEDED",
                format!("evaluation exceeded {:?}", ctx.evaluation_deadline),
            ))
        }
    };
    let _ = facts_json;

    let result = EvaluationResult {
        id: EvaluationResultId::new(),
        organization_id: org,
        transaction_id: transaction.id,
        account_id: transaction.account_id,
        decision: engine_output.decision,
        triggered_rules: engine_output.triggered_rules.clone(),
        all_rule_results: engine_output.all_rule_results,
        actions: engine_output.actions.clone(),
        evaluated_at: chrono::Utc::now(),
        evaluation_duration_ms: started.elapsed().as_millis() as i64,
    };
    let result = ctx.uow.results().insert(result).await?;

    consolidate_alerts(ctx, org, &transaction, &selected, &engine_output.triggered_rules, result.id).await?;

    record_metrics(&result);
    emit_best_effort(ctx, org, &result).await;

    Ok(result)
}

async fn load_active_rules(ctx: &EvaluationContext<'_>, org: OrganizationId) -> Result<Vec<RuleVersion>> {
    if let Some(cached) = ctx.active_rules_cache.get(org) {
        metrics::counter!("compliance_cache_hits_total", "cache" => "active_rules").increment(1);
        return Ok(cached);
    }
    metrics::counter!("compliance_cache_misses_total", "cache" => "active_rules").increment(1);
    debug!(%org, "active rules cache miss, loading from repository");
    let versions = ctx.uow.versions().find_active_versions(org).await?;
    metrics::gauge!("compliance_active_rules_count", "organization" => org.to_string()).set(versions.len() as f64);
    ctx.active_rules_cache.put(org, versions.clone());
    Ok(versions)
}

async fn compute_decision(
    ctx: &EvaluationContext<'_>,
    org: OrganizationId,
    transaction: &Transaction,
    selected: &[&RuleVersion],
) -> Result<(serde_json::Value, crate::engine::EngineOutput)> {
    let windows: Vec<_> = selected.iter().filter_map(|r| r.window).collect();
    let list_candidates = list_lookup_candidates(transaction);

    // Fan out the independent fact-building computations (spec §4.10),
    // fan back in before evaluating.
    let (history, list_facts) = tokio::try_join!(
        ctx.uow.transactions().list_for_account_in_range(
            org,
            transaction.account_id,
            transaction.datetime - chrono::Duration::days(ctx.behavioral_lookback_days),
            transaction.datetime,
        ),
        resolve_list_facts(ctx, org, &list_candidates),
    )?;

    let baseline = crate::behavior::baseline_from_history(
        &history,
        transaction.datetime,
        ctx.behavioral_lookback_days,
        ctx.cold_start_threshold,
    );
    let deviation = crate::behavior::deviation_from_baseline(transaction, &baseline);

    let aggregation = build_aggregation_facts(&history, transaction.datetime, &windows);
    let facts = build_fact_bundle(transaction, aggregation, &list_facts, &baseline, &deviation)
        .map_err(ComplianceError::from)?;

    let output = evaluate_transaction(selected, &facts)?;
    Ok((facts, output))
}

async fn resolve_list_facts(
    ctx: &EvaluationContext<'_>,
    org: OrganizationId,
    candidates: &[(String, String)],
) -> Result<crate::lists::ListFacts> {
    let service = ComplianceListService::new(ctx.uow.lists(), ctx.list_facts_cache);
    service.resolve_list_facts(org, candidates).await
}

async fn consolidate_alerts(
    ctx: &EvaluationContext<'_>,
    org: OrganizationId,
    transaction: &Transaction,
    selected: &[&RuleVersion],
    triggered: &[crate::model::RuleOutcome],
    evaluation_result_id: EvaluationResultId,
) -> Result<()> {
    let triggered_ids: std::collections::HashSet<_> = triggered.iter().map(|t| t.rule_version_id).collect();
    let mut candidates = Vec::new();
    for rule in selected.iter().filter(|r| triggered_ids.contains(&r.id)) {
        for action in &rule.actions {
            if action.action_type == ActionType::CreateAlert {
                candidates.push(AlertCandidate { rule, action });
            }
        }
    }
    if candidates.is_empty() {
        return Ok(());
    }

    let service = AlertService::new(ctx.uow.alerts());
    let alerts = service
        .consolidate(
            org,
            transaction.account_id,
            transaction.id,
            transaction.datetime,
            evaluation_result_id,
            &candidates,
        )
        .await?;

    for alert in &alerts {
        ctx.stream.emit_alert(org, alert).await;
    }
    Ok(())
}

fn record_metrics(result: &EvaluationResult) {
    metrics::counter!("compliance_transactions_ingested_total", "decision" => result.decision.to_string()).increment(1);
    metrics::counter!("compliance_rule_evaluations_total").increment(result.all_rule_results.len() as u64);
}

async fn emit_best_effort(ctx: &EvaluationContext<'_>, org: OrganizationId, result: &EvaluationResult) {
    // Streaming emission happens after the result is already durably
    // committed; a failure here must never surface as an evaluation
    // failure (spec §4.10 step 8, §7).
    ctx.stream.emit_evaluation(org, result).await;
    if result.evaluation_duration_ms > 0 {
        metrics::histogram!("compliance_evaluation_latency_seconds")
            .record(result.evaluation_duration_ms as f64 / 1000.0);
    }
}

#[allow(dead_code)]
fn log_cache_outage(org: OrganizationId) {
    warn!(%org, "cache unavailable, falling back to direct repository read");
}
