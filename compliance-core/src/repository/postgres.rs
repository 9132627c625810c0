//! Postgres-backed repository implementation.
//!
//! Schema (see `migrations/` in a deployed environment — not carried in
//! this crate):
//!
//! ```sql
//! create table rule_templates (
//!   id uuid primary key, organization_id uuid not null, name text not null,
//!   description text, category text,
//!   created_at timestamptz not null, updated_at timestamptz not null,
//!   deactivated_at timestamptz
//! );
//! create table rule_versions (
//!   id uuid primary key, template_id uuid not null references rule_templates(id),
//!   organization_id uuid not null, version int not null,
//!   parent_version_id uuid references rule_versions(id),
//!   conditions jsonb not null, effective_conditions jsonb not null,
//!   actions jsonb not null, priority int not null, window jsonb,
//!   enabled bool not null, created_at timestamptz not null, created_by text,
//!   active_at timestamptz, deactivated_at timestamptz
//! );
//! create index rule_versions_active_idx on rule_versions (organization_id) where deactivated_at is null and active_at is not null;
//! create table transactions (
//!   id uuid primary key, organization_id uuid not null, account_id uuid not null,
//!   type text not null, amount double precision not null, currency text not null,
//!   amount_normalized double precision, currency_normalized text,
//!   datetime timestamptz not null, country text, counterparty_id text, channel text,
//!   subtype text, quantity double precision, asset text, price double precision,
//!   origin text, data jsonb not null, metadata jsonb not null, created_by text
//! );
//! create index transactions_account_window_idx on transactions (organization_id, account_id, datetime);
//! create table evaluation_results (
//!   id uuid primary key, organization_id uuid not null, transaction_id uuid not null,
//!   account_id uuid not null, decision text not null,
//!   triggered_rules jsonb not null, all_rule_results jsonb not null, actions jsonb not null,
//!   evaluated_at timestamptz not null, evaluation_duration_ms bigint not null
//! );
//! create table alerts (
//!   id uuid primary key, organization_id uuid not null, account_id uuid not null,
//!   rule_version_id uuid not null, transaction_id uuid not null, evaluation_result_id uuid not null,
//!   window_start text not null, dedup_key text not null,
//!   status text not null, severity text, category text, message text,
//!   suppressed_count bigint not null, metadata jsonb not null,
//!   created_at timestamptz not null, updated_at timestamptz not null, resolved_at timestamptz
//! );
//! create unique index alerts_dedup_key_idx on alerts (organization_id, dedup_key);
//! create table compliance_lists (
//!   id uuid primary key, organization_id uuid not null, name text not null,
//!   description text, created_at timestamptz not null
//! );
//! create table compliance_entries (
//!   id uuid primary key, list_id uuid not null references compliance_lists(id),
//!   organization_id uuid not null, entity_type text not null, value text not null,
//!   reason text, added_at timestamptz not null
//! );
//! create index compliance_entries_lookup_idx on compliance_entries (organization_id, entity_type, value);
//! ```

use crate::alerts::{Alert, AlertStatus};
use crate::error::Result;
use crate::lists::{ComplianceEntry, ComplianceList};
use crate::model::{ActionDefinition, EvaluationResult, RuleOutcome, Transaction};
use crate::repository::traits::{
    AlertRepository, ComplianceListRepository, EvaluationResultRepository, RuleTemplateRepository,
    RuleVersionRepository, TransactionRepository, UnitOfWork,
};
use crate::rules::template::RuleTemplate;
use crate::rules::version::RuleVersion;
use crate::types::{
    AccountId, AlertId, ComplianceEntryId, ComplianceListId, Decision, EvaluationResultId, OrganizationId,
    RuleTemplateId, RuleVersionId, TransactionId,
};
use crate::window::WindowSpec;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};

pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct TemplateRow {
    id: uuid::Uuid,
    organization_id: uuid::Uuid,
    name: String,
    description: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deactivated_at: Option<DateTime<Utc>>,
}

impl From<TemplateRow> for RuleTemplate {
    fn from(r: TemplateRow) -> Self {
        RuleTemplate {
            id: r.id.into(),
            organization_id: r.organization_id.into(),
            name: r.name,
            description: r.description,
            category: r.category,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deactivated_at: r.deactivated_at,
        }
    }
}

#[async_trait]
impl RuleTemplateRepository for PostgresRepository {
    async fn insert(&self, template: RuleTemplate) -> Result<RuleTemplate> {
        sqlx::query(
            "insert into rule_templates (id, organization_id, name, description, category, created_at, updated_at, deactivated_at) \
             values ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(template.id.0)
        .bind(template.organization_id.0)
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.category)
        .bind(template.created_at)
        .bind(template.updated_at)
        .bind(template.deactivated_at)
        .execute(&self.pool)
        .await?;
        Ok(template)
    }

    async fn get(&self, org: OrganizationId, id: RuleTemplateId) -> Result<Option<RuleTemplate>> {
        let row = sqlx::query_as::<_, TemplateRow>(
            "select id, organization_id, name, description, category, created_at, updated_at, deactivated_at \
             from rule_templates where id = $1 and organization_id = $2",
        )
        .bind(id.0)
        .bind(org.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_by_org(&self, org: OrganizationId) -> Result<Vec<RuleTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "select id, organization_id, name, description, category, created_at, updated_at, deactivated_at \
             from rule_templates where organization_id = $1 order by created_at",
        )
        .bind(org.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, template: RuleTemplate) -> Result<RuleTemplate> {
        sqlx::query(
            "update rule_templates set name = $1, description = $2, category = $3, updated_at = $4, deactivated_at = $5 \
             where id = $6 and organization_id = $7",
        )
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.category)
        .bind(template.updated_at)
        .bind(template.deactivated_at)
        .bind(template.id.0)
        .bind(template.organization_id.0)
        .execute(&self.pool)
        .await?;
        Ok(template)
    }
}

#[async_trait]
impl RuleVersionRepository for PostgresRepository {
    async fn insert(&self, version: RuleVersion) -> Result<RuleVersion> {
        sqlx::query(
            "insert into rule_versions (id, template_id, organization_id, version, parent_version_id, \
             conditions, effective_conditions, actions, priority, window, enabled, created_at, created_by, \
             active_at, deactivated_at) values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15)",
        )
        .bind(version.id.0)
        .bind(version.template_id.0)
        .bind(version.organization_id.0)
        .bind(version.version)
        .bind(version.parent_version_id.map(|v| v.0))
        .bind(&version.conditions)
        .bind(&version.effective_conditions)
        .bind(serde_json::to_value(&version.actions)?)
        .bind(version.priority)
        .bind(version.window.map(|w| serde_json::to_value(w)).transpose()?)
        .bind(version.enabled)
        .bind(version.created_at)
        .bind(&version.created_by)
        .bind(version.active_at)
        .bind(version.deactivated_at)
        .execute(&self.pool)
        .await?;
        Ok(version)
    }

    async fn get(&self, org: OrganizationId, id: RuleVersionId) -> Result<Option<RuleVersion>> {
        let row = sqlx::query("select * from rule_versions where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_version).transpose()
    }

    async fn list_by_template(&self, org: OrganizationId, template_id: RuleTemplateId) -> Result<Vec<RuleVersion>> {
        let rows = sqlx::query(
            "select * from rule_versions where organization_id = $1 and template_id = $2 order by version",
        )
        .bind(org.0)
        .bind(template_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_version).collect()
    }

    async fn find_active_versions(&self, org: OrganizationId) -> Result<Vec<RuleVersion>> {
        let rows = sqlx::query(
            "select * from rule_versions where organization_id = $1 and active_at is not null and deactivated_at is null",
        )
        .bind(org.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_version).collect()
    }

    async fn update(&self, version: RuleVersion) -> Result<RuleVersion> {
        sqlx::query("update rule_versions set enabled = $1, active_at = $2, deactivated_at = $3 where id = $4 and organization_id = $5")
            .bind(version.enabled)
            .bind(version.active_at)
            .bind(version.deactivated_at)
            .bind(version.id.0)
            .bind(version.organization_id.0)
            .execute(&self.pool)
            .await?;
        Ok(version)
    }
}

fn row_to_version(row: sqlx::postgres::PgRow) -> Result<RuleVersion> {
    let window_json: Option<serde_json::Value> = row.try_get("window")?;
    let actions_json: serde_json::Value = row.try_get("actions")?;
    Ok(RuleVersion {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        template_id: row.try_get::<uuid::Uuid, _>("template_id")?.into(),
        organization_id: row.try_get::<uuid::Uuid, _>("organization_id")?.into(),
        version: row.try_get("version")?,
        parent_version_id: row.try_get::<Option<uuid::Uuid>, _>("parent_version_id")?.map(Into::into),
        conditions: row.try_get("conditions")?,
        effective_conditions: row.try_get("effective_conditions")?,
        actions: serde_json::from_value(actions_json)?,
        priority: row.try_get("priority")?,
        window: window_json.map(serde_json::from_value::<WindowSpec>).transpose()?,
        enabled: row.try_get("enabled")?,
        created_at: row.try_get("created_at")?,
        created_by: row.try_get("created_by")?,
        active_at: row.try_get("active_at")?,
        deactivated_at: row.try_get("deactivated_at")?,
    })
}

#[async_trait]
impl TransactionRepository for PostgresRepository {
    async fn insert(&self, t: Transaction) -> Result<Transaction> {
        sqlx::query(
            "insert into transactions (id, organization_id, account_id, type, amount, currency, \
             amount_normalized, currency_normalized, datetime, country, counterparty_id, channel, subtype, \
             quantity, asset, price, origin, data, metadata, created_by) \
             values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19,$20)",
        )
        .bind(t.id.0)
        .bind(t.organization_id.0)
        .bind(t.account_id.0)
        .bind(&t.transaction_type)
        .bind(t.amount)
        .bind(&t.currency)
        .bind(t.amount_normalized)
        .bind(&t.currency_normalized)
        .bind(t.datetime)
        .bind(&t.country)
        .bind(&t.counterparty_id)
        .bind(&t.channel)
        .bind(&t.subtype)
        .bind(t.quantity)
        .bind(&t.asset)
        .bind(t.price)
        .bind(&t.origin)
        .bind(&t.data)
        .bind(&t.metadata)
        .bind(&t.created_by)
        .execute(&self.pool)
        .await?;
        Ok(t)
    }

    async fn get(&self, org: OrganizationId, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query("select * from transactions where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_transaction).transpose()
    }

    async fn list_for_account_in_range(
        &self,
        org: OrganizationId,
        account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "select * from transactions where organization_id = $1 and account_id = $2 \
             and datetime >= $3 and datetime < $4 order by datetime",
        )
        .bind(org.0)
        .bind(account.0)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_transaction).collect()
    }
}

fn row_to_transaction(row: sqlx::postgres::PgRow) -> Result<Transaction> {
    Ok(Transaction {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        organization_id: row.try_get::<uuid::Uuid, _>("organization_id")?.into(),
        account_id: row.try_get::<uuid::Uuid, _>("account_id")?.into(),
        transaction_type: row.try_get("type")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        amount_normalized: row.try_get("amount_normalized")?,
        currency_normalized: row.try_get("currency_normalized")?,
        datetime: row.try_get("datetime")?,
        country: row.try_get("country")?,
        counterparty_id: row.try_get("counterparty_id")?,
        channel: row.try_get("channel")?,
        subtype: row.try_get("subtype")?,
        quantity: row.try_get("quantity")?,
        asset: row.try_get("asset")?,
        price: row.try_get("price")?,
        origin: row.try_get("origin")?,
        data: row.try_get("data")?,
        metadata: row.try_get("metadata")?,
        created_by: row.try_get("created_by")?,
    })
}

#[async_trait]
impl EvaluationResultRepository for PostgresRepository {
    async fn insert(&self, r: EvaluationResult) -> Result<EvaluationResult> {
        sqlx::query(
            "insert into evaluation_results (id, organization_id, transaction_id, account_id, decision, \
             triggered_rules, all_rule_results, actions, evaluated_at, evaluation_duration_ms) \
             values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)",
        )
        .bind(r.id.0)
        .bind(r.organization_id.0)
        .bind(r.transaction_id.0)
        .bind(r.account_id.0)
        .bind(r.decision.to_string())
        .bind(serde_json::to_value(&r.triggered_rules)?)
        .bind(serde_json::to_value(&r.all_rule_results)?)
        .bind(serde_json::to_value(&r.actions)?)
        .bind(r.evaluated_at)
        .bind(r.evaluation_duration_ms)
        .execute(&self.pool)
        .await?;
        Ok(r)
    }

    async fn get(&self, org: OrganizationId, id: EvaluationResultId) -> Result<Option<EvaluationResult>> {
        let row = sqlx::query("select * from evaluation_results where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_result).transpose()
    }
}

fn row_to_result(row: sqlx::postgres::PgRow) -> Result<EvaluationResult> {
    let decision_str: String = row.try_get("decision")?;
    let decision = match decision_str.as_str() {
        "BLOCK" => Decision::Block,
        "REVIEW" => Decision::Review,
        _ => Decision::Allow,
    };
    let triggered: serde_json::Value = row.try_get("triggered_rules")?;
    let all_results: serde_json::Value = row.try_get("all_rule_results")?;
    let actions: serde_json::Value = row.try_get("actions")?;
    Ok(EvaluationResult {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        organization_id: row.try_get::<uuid::Uuid, _>("organization_id")?.into(),
        transaction_id: row.try_get::<uuid::Uuid, _>("transaction_id")?.into(),
        account_id: row.try_get::<uuid::Uuid, _>("account_id")?.into(),
        decision,
        triggered_rules: serde_json::from_value::<Vec<RuleOutcome>>(triggered)?,
        all_rule_results: serde_json::from_value::<Vec<RuleOutcome>>(all_results)?,
        actions: serde_json::from_value::<Vec<ActionDefinition>>(actions)?,
        evaluated_at: row.try_get("evaluated_at")?,
        evaluation_duration_ms: row.try_get("evaluation_duration_ms")?,
    })
}

#[async_trait]
impl AlertRepository for PostgresRepository {
    async fn insert(&self, a: Alert) -> Result<Alert> {
        sqlx::query(
            "insert into alerts (id, organization_id, account_id, rule_version_id, transaction_id, \
             evaluation_result_id, window_start, dedup_key, status, severity, category, message, \
             suppressed_count, metadata, created_at, updated_at, resolved_at) \
             values ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)",
        )
        .bind(a.id.0)
        .bind(a.organization_id.0)
        .bind(a.account_id.0)
        .bind(a.rule_version_id.0)
        .bind(a.transaction_id.0)
        .bind(a.evaluation_result_id.0)
        .bind(&a.window_start)
        .bind(&a.dedup_key)
        .bind(a.status.to_string())
        .bind(&a.severity)
        .bind(&a.category)
        .bind(&a.message)
        .bind(a.suppressed_count)
        .bind(serde_json::to_value(&a.metadata)?)
        .bind(a.created_at)
        .bind(a.updated_at)
        .bind(a.resolved_at)
        .execute(&self.pool)
        .await?;
        Ok(a)
    }

    async fn get(&self, org: OrganizationId, id: AlertId) -> Result<Option<Alert>> {
        let row = sqlx::query("select * from alerts where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_alert).transpose()
    }

    async fn update(&self, a: Alert) -> Result<Alert> {
        sqlx::query(
            "update alerts set status = $1, suppressed_count = $2, metadata = $3, \
             updated_at = $4, resolved_at = $5 where id = $6 and organization_id = $7",
        )
        .bind(a.status.to_string())
        .bind(a.suppressed_count)
        .bind(serde_json::to_value(&a.metadata)?)
        .bind(a.updated_at)
        .bind(a.resolved_at)
        .bind(a.id.0)
        .bind(a.organization_id.0)
        .execute(&self.pool)
        .await?;
        Ok(a)
    }

    async fn find_by_dedup_keys(&self, org: OrganizationId, keys: &[String]) -> Result<Vec<Alert>> {
        let rows = sqlx::query("select * from alerts where organization_id = $1 and dedup_key = any($2)")
            .bind(org.0)
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_alert).collect()
    }

    async fn list_by_org(&self, org: OrganizationId, account: Option<AccountId>) -> Result<Vec<Alert>> {
        let rows = match account {
            Some(acc) => {
                sqlx::query("select * from alerts where organization_id = $1 and account_id = $2 order by created_at desc")
                    .bind(org.0)
                    .bind(acc.0)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("select * from alerts where organization_id = $1 order by created_at desc")
                    .bind(org.0)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(row_to_alert).collect()
    }
}

fn row_to_alert(row: sqlx::postgres::PgRow) -> Result<Alert> {
    let status_str: String = row.try_get("status")?;
    let status = match status_str.as_str() {
        "ACKNOWLEDGED" => AlertStatus::Acknowledged,
        "RESOLVED" => AlertStatus::Resolved,
        "DISMISSED" => AlertStatus::Dismissed,
        _ => AlertStatus::Open,
    };
    let metadata: serde_json::Value = row.try_get("metadata")?;
    Ok(Alert {
        id: row.try_get::<uuid::Uuid, _>("id")?.into(),
        organization_id: row.try_get::<uuid::Uuid, _>("organization_id")?.into(),
        account_id: row.try_get::<uuid::Uuid, _>("account_id")?.into(),
        rule_version_id: row.try_get::<uuid::Uuid, _>("rule_version_id")?.into(),
        transaction_id: row.try_get::<uuid::Uuid, _>("transaction_id")?.into(),
        evaluation_result_id: row.try_get::<uuid::Uuid, _>("evaluation_result_id")?.into(),
        window_start: row.try_get("window_start")?,
        dedup_key: row.try_get("dedup_key")?,
        status,
        severity: row.try_get("severity")?,
        category: row.try_get("category")?,
        message: row.try_get("message")?,
        suppressed_count: row.try_get("suppressed_count")?,
        metadata: serde_json::from_value(metadata)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        resolved_at: row.try_get("resolved_at")?,
    })
}

#[async_trait]
impl ComplianceListRepository for PostgresRepository {
    async fn insert_list(&self, list: ComplianceList) -> Result<ComplianceList> {
        sqlx::query("insert into compliance_lists (id, organization_id, name, description, created_at) values ($1,$2,$3,$4,$5)")
            .bind(list.id.0)
            .bind(list.organization_id.0)
            .bind(&list.name)
            .bind(&list.description)
            .bind(list.created_at)
            .execute(&self.pool)
            .await?;
        Ok(list)
    }

    async fn get_list(&self, org: OrganizationId, id: ComplianceListId) -> Result<Option<ComplianceList>> {
        let row = sqlx::query("select * from compliance_lists where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r: sqlx::postgres::PgRow| ComplianceList {
            id: r.get::<uuid::Uuid, _>("id").into(),
            organization_id: r.get::<uuid::Uuid, _>("organization_id").into(),
            name: r.get("name"),
            description: r.get("description"),
            created_at: r.get("created_at"),
        }))
    }

    async fn list_lists(&self, org: OrganizationId) -> Result<Vec<ComplianceList>> {
        let rows = sqlx::query("select * from compliance_lists where organization_id = $1 order by created_at")
            .bind(org.0)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| ComplianceList {
                id: r.get::<uuid::Uuid, _>("id").into(),
                organization_id: r.get::<uuid::Uuid, _>("organization_id").into(),
                name: r.get("name"),
                description: r.get("description"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn insert_entry(&self, entry: ComplianceEntry) -> Result<ComplianceEntry> {
        sqlx::query(
            "insert into compliance_entries (id, list_id, organization_id, entity_type, value, reason, added_at) \
             values ($1,$2,$3,$4,$5,$6,$7)",
        )
        .bind(entry.id.0)
        .bind(entry.list_id.0)
        .bind(entry.organization_id.0)
        .bind(&entry.entity_type)
        .bind(&entry.value)
        .bind(&entry.reason)
        .bind(entry.added_at)
        .execute(&self.pool)
        .await?;
        Ok(entry)
    }

    async fn remove_entry(&self, org: OrganizationId, id: ComplianceEntryId) -> Result<()> {
        sqlx::query("delete from compliance_entries where id = $1 and organization_id = $2")
            .bind(id.0)
            .bind(org.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn batch_lookup(
        &self,
        org: OrganizationId,
        entity_type: &str,
        values: &[String],
    ) -> Result<Vec<ComplianceEntry>> {
        let rows = sqlx::query(
            "select * from compliance_entries where organization_id = $1 and entity_type = $2 and value = any($3)",
        )
        .bind(org.0)
        .bind(entity_type)
        .bind(values)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ComplianceEntry {
                id: r.get::<uuid::Uuid, _>("id").into(),
                list_id: r.get::<uuid::Uuid, _>("list_id").into(),
                organization_id: r.get::<uuid::Uuid, _>("organization_id").into(),
                entity_type: r.get("entity_type"),
                value: r.get("value"),
                reason: r.get("reason"),
                added_at: r.get("added_at"),
            })
            .collect())
    }
}

impl UnitOfWork for PostgresRepository {
    fn templates(&self) -> &dyn RuleTemplateRepository {
        self
    }

    fn versions(&self) -> &dyn RuleVersionRepository {
        self
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        self
    }

    fn results(&self) -> &dyn EvaluationResultRepository {
        self
    }

    fn alerts(&self) -> &dyn AlertRepository {
        self
    }

    fn lists(&self) -> &dyn ComplianceListRepository {
        self
    }
}
