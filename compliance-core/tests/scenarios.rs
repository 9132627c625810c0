//! End-to-end transcription of the seed scenarios S1-S6: ingest a
//! transaction through the full pipeline against an in-memory repository
//! and assert the decision/alert shape the scenario describes.

use chrono::{DateTime, Utc};
use compliance_core::alerts::{AlertService, AlertStatus};
use compliance_core::cache::{ActiveRulesCache, ListFactsCache};
use compliance_core::model::{ActionDefinition, Transaction};
use compliance_core::pipeline::{ingest_and_evaluate, EvaluationContext};
use compliance_core::repository::memory::MemoryRepository;
use compliance_core::rules::template::RuleTemplateService;
use compliance_core::rules::version::RuleVersionService;
use compliance_core::stream::NullSink;
use compliance_core::types::{AccountId, Decision, OrganizationId};
use compliance_core::window::{WindowSpec, WindowUnit};
use serde_json::json;
use std::time::Duration;

fn action(json_value: serde_json::Value) -> ActionDefinition {
    serde_json::from_value(json_value).unwrap()
}

fn alert_action(severity: &str, category: &str) -> ActionDefinition {
    action(json!({"type": "create_alert", "severity": severity, "category": category}))
}

fn block_action() -> ActionDefinition {
    action(json!({"type": "block_transaction"}))
}

fn transaction(
    org: OrganizationId,
    account: AccountId,
    amount: f64,
    transaction_type: &str,
    datetime: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: compliance_core::types::TransactionId::new(),
        organization_id: org,
        account_id: account,
        transaction_type: transaction_type.to_string(),
        amount,
        currency: "USD".to_string(),
        amount_normalized: None,
        currency_normalized: None,
        datetime,
        country: None,
        counterparty_id: None,
        channel: None,
        subtype: None,
        quantity: None,
        asset: None,
        price: None,
        origin: None,
        data: serde_json::Value::Null,
        metadata: serde_json::Value::Null,
        created_by: None,
    }
}

fn context(repo: &MemoryRepository, active_rules_cache: &ActiveRulesCache, list_facts_cache: &ListFactsCache) -> EvaluationContext<'_> {
    EvaluationContext {
        uow: repo,
        active_rules_cache,
        list_facts_cache: Some(list_facts_cache),
        stream: &NullSink,
        behavioral_lookback_days: 30,
        cold_start_threshold: 5,
        evaluation_deadline: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn s1_high_amount_aml_rule_triggers_review() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let template = templates.create(org, "high amount AML".into(), None, None).await.unwrap();
    let versions = RuleVersionService::new(&repo);
    let version = versions
        .create(
            org,
            template.id,
            json!({"all": [
                {"fact": "transaction.amount", "operator": "greaterThan", "value": 10000},
                {"fact": "transaction.type", "operator": "in", "value": ["CASH_OUT", "DEBIT"]},
            ]}),
            vec![alert_action("HIGH", "AML")],
            1,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, version.id).await.unwrap();

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let datetime = "2026-02-13T11:00:00Z".parse().unwrap();
    let txn = transaction(org, account, 15000.0, "CASH_OUT", datetime);
    let result = ingest_and_evaluate(&ctx, org, txn).await.unwrap();

    assert_eq!(result.decision, Decision::Review);

    let alerts = AlertService::new(&repo).list(org, Some(account)).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity.as_deref(), Some("HIGH"));
    assert_eq!(alerts[0].category.as_deref(), Some("AML"));
    assert_eq!(alerts[0].suppressed_count, 0);
}

#[tokio::test]
async fn s2_dedup_within_the_day() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let template = templates.create(org, "high amount AML".into(), None, None).await.unwrap();
    let versions = RuleVersionService::new(&repo);
    let version = versions
        .create(
            org,
            template.id,
            json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 10000}),
            vec![alert_action("HIGH", "AML")],
            1,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, version.id).await.unwrap();

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let first = transaction(org, account, 15000.0, "CASH_OUT", "2026-02-13T11:00:00Z".parse().unwrap());
    ingest_and_evaluate(&ctx, org, first).await.unwrap();

    let second = transaction(org, account, 25000.0, "DEBIT", "2026-02-13T12:00:00Z".parse().unwrap());
    let result = ingest_and_evaluate(&ctx, org, second).await.unwrap();
    assert_eq!(result.decision, Decision::Review);

    let alerts = AlertService::new(&repo).list(org, Some(account)).await.unwrap();
    assert_eq!(alerts.len(), 1, "no new alert row should be created");
    assert_eq!(alerts[0].suppressed_count, 1);
    assert_eq!(alerts[0].metadata.related_transaction_ids.len(), 2);
    assert_eq!(alerts[0].metadata.related_evaluation_result_ids.len(), 2);
}

#[tokio::test]
async fn s3_resolve_then_realert_creates_a_new_alert() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let template = templates.create(org, "high amount AML".into(), None, None).await.unwrap();
    let versions = RuleVersionService::new(&repo);
    let version = versions
        .create(
            org,
            template.id,
            json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 10000}),
            vec![alert_action("HIGH", "AML")],
            1,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, version.id).await.unwrap();

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let first = transaction(org, account, 15000.0, "CASH_OUT", "2026-02-13T11:00:00Z".parse().unwrap());
    ingest_and_evaluate(&ctx, org, first).await.unwrap();

    let alert_service = AlertService::new(&repo);
    let alerts = alert_service.list(org, Some(account)).await.unwrap();
    assert_eq!(alerts.len(), 1);
    alert_service.transition(org, alerts[0].id, AlertStatus::Resolved).await.unwrap();

    let second = transaction(org, account, 15000.0, "CASH_OUT", "2026-02-13T13:00:00Z".parse().unwrap());
    ingest_and_evaluate(&ctx, org, second).await.unwrap();

    let alerts = alert_service.list(org, Some(account)).await.unwrap();
    assert_eq!(alerts.len(), 2, "a resolved alert is terminal; re-triggering creates a new row");
}

#[tokio::test]
async fn s4_block_dominates_review() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let review_template = templates.create(org, "medium review".into(), None, None).await.unwrap();
    let block_template = templates.create(org, "hard block".into(), None, None).await.unwrap();

    let versions = RuleVersionService::new(&repo);
    let review_version = versions
        .create(
            org,
            review_template.id,
            json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}),
            vec![alert_action("MEDIUM", "VELOCITY")],
            1,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, review_version.id).await.unwrap();

    let block_version = versions
        .create(
            org,
            block_template.id,
            json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}),
            vec![block_action()],
            2,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, block_version.id).await.unwrap();

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let txn = transaction(org, account, 5000.0, "CASH_OUT", "2026-02-13T11:00:00Z".parse().unwrap());
    let result = ingest_and_evaluate(&ctx, org, txn).await.unwrap();

    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.triggered_rules.len(), 2);
}

#[tokio::test]
async fn s5_sliding_window_velocity_excludes_the_anchor_transaction() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let template = templates.create(org, "velocity".into(), None, None).await.unwrap();
    let versions = RuleVersionService::new(&repo);
    let window = WindowSpec { duration: 24, unit: WindowUnit::Hours };
    let version = versions
        .create(
            org,
            template.id,
            json!({"fact": "aggregation.count_24hours", "operator": "greaterThan", "value": 5}),
            vec![alert_action("MEDIUM", "VELOCITY")],
            1,
            Some(window),
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, version.id).await.unwrap();

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let anchor: DateTime<Utc> = "2026-02-13T23:00:00Z".parse().unwrap();
    for hour in 1..=6 {
        let prior = transaction(org, account, 100.0, "DEBIT", anchor - chrono::Duration::hours(hour));
        ingest_and_evaluate(&ctx, org, prior).await.unwrap();
    }

    let current = transaction(org, account, 100.0, "DEBIT", anchor);
    let result = ingest_and_evaluate(&ctx, org, current).await.unwrap();
    assert_eq!(result.decision, Decision::Review, "6 prior transactions in-window should trigger the velocity rule");
}

#[tokio::test]
async fn s6_inheritance_merge_requires_both_parent_and_child_conditions() {
    let repo = MemoryRepository::default();
    let org = OrganizationId::new();
    let account = AccountId::new();

    let templates = RuleTemplateService::new(&repo, &repo);
    let template = templates.create(org, "cash out AML".into(), None, None).await.unwrap();
    let versions = RuleVersionService::new(&repo);

    let parent = versions
        .create(
            org,
            template.id,
            json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 5000}),
            vec![],
            1,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    versions.activate(org, parent.id).await.unwrap();

    let child = versions
        .create(
            org,
            template.id,
            json!({"fact": "transaction.type", "operator": "equal", "value": "CASH_OUT"}),
            vec![alert_action("HIGH", "AML")],
            1,
            None,
            Some(parent.id),
            None,
        )
        .await
        .unwrap();
    versions.activate(org, child.id).await.unwrap();

    assert_eq!(child.effective_conditions["all"].as_array().unwrap().len(), 2);

    let active_rules_cache = ActiveRulesCache::new(Duration::from_secs(60));
    let list_facts_cache = ListFactsCache::new(Duration::from_secs(30));
    let ctx = context(&repo, &active_rules_cache, &list_facts_cache);

    let matches = transaction(org, account, 6000.0, "CASH_OUT", "2026-02-13T11:00:00Z".parse().unwrap());
    let result = ingest_and_evaluate(&ctx, org, matches).await.unwrap();
    assert_eq!(result.decision, Decision::Review);

    let mismatches = transaction(org, account, 6000.0, "CASH_IN", "2026-02-13T12:00:00Z".parse().unwrap());
    let result = ingest_and_evaluate(&ctx, org, mismatches).await.unwrap();
    assert_eq!(result.decision, Decision::Allow);
}
