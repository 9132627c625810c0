//! Persistence trait boundary (spec §6). The pure services in this crate
//! never touch a database directly — they depend on these traits, and
//! [`crate::repository::memory`] / [`crate::repository::postgres`] provide
//! the two implementations.

use crate::alerts::Alert;
use crate::error::Result;
use crate::lists::{ComplianceEntry, ComplianceList};
use crate::model::{EvaluationResult, Transaction};
use crate::rules::template::RuleTemplate;
use crate::rules::version::RuleVersion;
use crate::types::{
    AccountId, AlertId, ComplianceEntryId, ComplianceListId, OrganizationId, RuleTemplateId,
    RuleVersionId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RuleTemplateRepository: Send + Sync {
    async fn insert(&self, template: RuleTemplate) -> Result<RuleTemplate>;
    async fn get(&self, org: OrganizationId, id: RuleTemplateId) -> Result<Option<RuleTemplate>>;
    async fn list_by_org(&self, org: OrganizationId) -> Result<Vec<RuleTemplate>>;
    async fn update(&self, template: RuleTemplate) -> Result<RuleTemplate>;
}

#[async_trait]
pub trait RuleVersionRepository: Send + Sync {
    async fn insert(&self, version: RuleVersion) -> Result<RuleVersion>;
    async fn get(&self, org: OrganizationId, id: RuleVersionId) -> Result<Option<RuleVersion>>;
    async fn list_by_template(&self, org: OrganizationId, template_id: RuleTemplateId) -> Result<Vec<RuleVersion>>;
    /// All currently-active versions across every template in the org
    /// (spec §4.5) — the set the evaluation engine runs against.
    async fn find_active_versions(&self, org: OrganizationId) -> Result<Vec<RuleVersion>>;
    async fn update(&self, version: RuleVersion) -> Result<RuleVersion>;
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, transaction: Transaction) -> Result<Transaction>;
    async fn get(&self, org: OrganizationId, id: crate::types::TransactionId) -> Result<Option<Transaction>>;
    /// Every transaction for `account` in `[start, end)`, ordered by `datetime`
    /// — the raw row set window/behavior facts are computed over.
    async fn list_for_account_in_range(
        &self,
        org: OrganizationId,
        account: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>>;
}

#[async_trait]
pub trait EvaluationResultRepository: Send + Sync {
    async fn insert(&self, result: EvaluationResult) -> Result<EvaluationResult>;
    async fn get(&self, org: OrganizationId, id: crate::types::EvaluationResultId) -> Result<Option<EvaluationResult>>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert(&self, alert: Alert) -> Result<Alert>;
    async fn get(&self, org: OrganizationId, id: AlertId) -> Result<Option<Alert>>;
    async fn update(&self, alert: Alert) -> Result<Alert>;
    /// Batched dedup-key lookup (spec §4.6 consolidation protocol) — one
    /// round trip for every candidate key produced by a single evaluation.
    async fn find_by_dedup_keys(&self, org: OrganizationId, keys: &[String]) -> Result<Vec<Alert>>;
    async fn list_by_org(&self, org: OrganizationId, account: Option<AccountId>) -> Result<Vec<Alert>>;
}

#[async_trait]
pub trait ComplianceListRepository: Send + Sync {
    async fn insert_list(&self, list: ComplianceList) -> Result<ComplianceList>;
    async fn get_list(&self, org: OrganizationId, id: ComplianceListId) -> Result<Option<ComplianceList>>;
    async fn list_lists(&self, org: OrganizationId) -> Result<Vec<ComplianceList>>;
    async fn insert_entry(&self, entry: ComplianceEntry) -> Result<ComplianceEntry>;
    async fn remove_entry(&self, org: OrganizationId, id: ComplianceEntryId) -> Result<()>;
    /// A single batched lookup across every list the org maintains for
    /// `entity_type`, matching any of `values` (spec §4.7).
    async fn batch_lookup(
        &self,
        org: OrganizationId,
        entity_type: &str,
        values: &[String],
    ) -> Result<Vec<ComplianceEntry>>;
}

/// The transactional boundary an evaluation runs inside (spec §4.10): one
/// commit wraps persist-transaction → load-rules → build-facts → evaluate
/// → persist-result → alert-consolidation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn templates(&self) -> &dyn RuleTemplateRepository;
    fn versions(&self) -> &dyn RuleVersionRepository;
    fn transactions(&self) -> &dyn TransactionRepository;
    fn results(&self) -> &dyn EvaluationResultRepository;
    fn alerts(&self) -> &dyn AlertRepository;
    fn lists(&self) -> &dyn ComplianceListRepository;
}
