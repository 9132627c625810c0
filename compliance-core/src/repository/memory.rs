//! In-process repository implementation backed by `dashmap`/`parking_lot`.
//! Upholds the same invariants as the Postgres implementation; used by
//! the crate's integration tests and suitable for single-node deployments
//! that don't need durability across restarts.

use crate::alerts::Alert;
use crate::error::Result;
use crate::lists::{ComplianceEntry, ComplianceList};
use crate::model::{EvaluationResult, Transaction};
use crate::repository::traits::{
    AlertRepository, ComplianceListRepository, EvaluationResultRepository, RuleTemplateRepository,
    RuleVersionRepository, TransactionRepository, UnitOfWork,
};
use crate::rules::template::RuleTemplate;
use crate::rules::version::RuleVersion;
use crate::types::{
    AccountId, AlertId, ComplianceEntryId, ComplianceListId, EvaluationResultId, OrganizationId,
    RuleTemplateId, RuleVersionId, TransactionId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryRepository {
    templates: DashMap<RuleTemplateId, RuleTemplate>,
    versions: DashMap<RuleVersionId, RuleVersion>,
    transactions: DashMap<TransactionId, Transaction>,
    results: DashMap<EvaluationResultId, EvaluationResult>,
    alerts: DashMap<AlertId, Alert>,
    lists: DashMap<ComplianceListId, ComplianceList>,
    entries: DashMap<ComplianceEntryId, ComplianceEntry>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleTemplateRepository for MemoryRepository {
    async fn insert(&self, template: RuleTemplate) -> Result<RuleTemplate> {
        self.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn get(&self, org: OrganizationId, id: RuleTemplateId) -> Result<Option<RuleTemplate>> {
        Ok(self.templates.get(&id).filter(|t| t.organization_id == org).map(|t| t.clone()))
    }

    async fn list_by_org(&self, org: OrganizationId) -> Result<Vec<RuleTemplate>> {
        Ok(self.templates.iter().filter(|t| t.organization_id == org).map(|t| t.clone()).collect())
    }

    async fn update(&self, template: RuleTemplate) -> Result<RuleTemplate> {
        self.templates.insert(template.id, template.clone());
        Ok(template)
    }
}

#[async_trait]
impl RuleVersionRepository for MemoryRepository {
    async fn insert(&self, version: RuleVersion) -> Result<RuleVersion> {
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }

    async fn get(&self, org: OrganizationId, id: RuleVersionId) -> Result<Option<RuleVersion>> {
        Ok(self.versions.get(&id).filter(|v| v.organization_id == org).map(|v| v.clone()))
    }

    async fn list_by_template(&self, org: OrganizationId, template_id: RuleTemplateId) -> Result<Vec<RuleVersion>> {
        Ok(self
            .versions
            .iter()
            .filter(|v| v.organization_id == org && v.template_id == template_id)
            .map(|v| v.clone())
            .collect())
    }

    async fn find_active_versions(&self, org: OrganizationId) -> Result<Vec<RuleVersion>> {
        Ok(self
            .versions
            .iter()
            .filter(|v| v.organization_id == org && v.is_active())
            .map(|v| v.clone())
            .collect())
    }

    async fn update(&self, version: RuleVersion) -> Result<RuleVersion> {
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }
}

#[async_trait]
impl TransactionRepository for MemoryRepository {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction> {
        self.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn get(&self, org: OrganizationId, id: TransactionId) -> Result<Option<Transaction>> {
        Ok(self.transactions.get(&id).filter(|t| t.organization_id == org).map(|t| t.clone()))
    }

    async fn list_for_account_in_range(
        &self,
        org: OrganizationId,
        account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| {
                t.organization_id == org && t.account_id == account && t.datetime >= start && t.datetime < end
            })
            .map(|t| t.clone())
            .collect();
        rows.sort_by_key(|t| t.datetime);
        Ok(rows)
    }
}

#[async_trait]
impl EvaluationResultRepository for MemoryRepository {
    async fn insert(&self, result: EvaluationResult) -> Result<EvaluationResult> {
        self.results.insert(result.id, result.clone());
        Ok(result)
    }

    async fn get(&self, org: OrganizationId, id: EvaluationResultId) -> Result<Option<EvaluationResult>> {
        Ok(self.results.get(&id).filter(|r| r.organization_id == org).map(|r| r.clone()))
    }
}

#[async_trait]
impl AlertRepository for MemoryRepository {
    async fn insert(&self, alert: Alert) -> Result<Alert> {
        self.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn get(&self, org: OrganizationId, id: AlertId) -> Result<Option<Alert>> {
        Ok(self.alerts.get(&id).filter(|a| a.organization_id == org).map(|a| a.clone()))
    }

    async fn update(&self, alert: Alert) -> Result<Alert> {
        self.alerts.insert(alert.id, alert.clone());
        Ok(alert)
    }

    async fn find_by_dedup_keys(&self, org: OrganizationId, keys: &[String]) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .iter()
            .filter(|a| a.organization_id == org && keys.contains(&a.dedup_key))
            .map(|a| a.clone())
            .collect())
    }

    async fn list_by_org(&self, org: OrganizationId, account: Option<AccountId>) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .iter()
            .filter(|a| a.organization_id == org && account.map_or(true, |acc| a.account_id == acc))
            .map(|a| a.clone())
            .collect())
    }
}

#[async_trait]
impl ComplianceListRepository for MemoryRepository {
    async fn insert_list(&self, list: ComplianceList) -> Result<ComplianceList> {
        self.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn get_list(&self, org: OrganizationId, id: ComplianceListId) -> Result<Option<ComplianceList>> {
        Ok(self.lists.get(&id).filter(|l| l.organization_id == org).map(|l| l.clone()))
    }

    async fn list_lists(&self, org: OrganizationId) -> Result<Vec<ComplianceList>> {
        Ok(self.lists.iter().filter(|l| l.organization_id == org).map(|l| l.clone()).collect())
    }

    async fn insert_entry(&self, entry: ComplianceEntry) -> Result<ComplianceEntry> {
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn remove_entry(&self, org: OrganizationId, id: ComplianceEntryId) -> Result<()> {
        self.entries.remove_if(&id, |_, e| e.organization_id == org);
        Ok(())
    }

    async fn batch_lookup(
        &self,
        org: OrganizationId,
        entity_type: &str,
        values: &[String],
    ) -> Result<Vec<ComplianceEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.organization_id == org && e.entity_type == entity_type && values.contains(&e.value))
            .map(|e| e.clone())
            .collect())
    }
}

impl UnitOfWork for MemoryRepository {
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
