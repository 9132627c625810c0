//! Compliance List Service (spec §4.7): sanctions/watchlist-style entity
//! lists and the batched lookup that turns them into fact-bundle input.

use crate::cache::ListFactsCache;
use crate::error::{ComplianceError, Result};
use crate::repository::traits::ComplianceListRepository;
use crate::types::{ComplianceEntryId, ComplianceListId, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named collection of watched entities (spec §3), e.g. "OFAC SDN" or an
/// internal high-risk-counterparty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceList {
    pub id: ComplianceListId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One watched value on a list, scoped to an entity type (e.g.
/// `"counterparty_id"`, `"country"`, `"account_id"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceEntry {
    pub id: ComplianceEntryId,
    pub list_id: ComplianceListId,
    pub organization_id: OrganizationId,
    pub entity_type: String,
    pub value: String,
    pub reason: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// The `lists` section of a fact bundle (spec §4.10): one boolean-ish
/// membership projection per entity type referenced by a transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFacts {
    pub matches: BTreeMap<String, Vec<String>>,
}

impl ListFacts {
    pub fn is_listed(&self, entity_type: &str) -> bool {
        self.matches.get(entity_type).is_some_and(|lists| !lists.is_empty())
    }
}

pub struct ComplianceListService<'a> {
    repo: &'a dyn ComplianceListRepository,
    cache: Option<&'a ListFactsCache>,
}

impl<'a> ComplianceListService<'a> {
    pub fn new(repo: &'a dyn ComplianceListRepository, cache: Option<&'a ListFactsCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn create_list(&self, org: OrganizationId, name: String, description: Option<String>) -> Result<ComplianceList> {
        if name.trim().is_empty() {
            return Err(ComplianceError::ValidationError(vec!["name must be non-empty".into()]));
        }
        let list = ComplianceList { id: ComplianceListId::new(), organization_id: org, name, description, created_at: Utc::now() };
        self.repo.insert_list(list).await
    }

    pub async fn get_list(&self, org: OrganizationId, id: ComplianceListId) -> Result<ComplianceList> {
        self.repo.get_list(org, id).await?.ok_or_else(|| ComplianceError::not_found("compliance_list", id.to_string()))
    }

    pub async fn list_lists(&self, org: OrganizationId) -> Result<Vec<ComplianceList>> {
        self.repo.list_lists(org).await
    }

    pub async fn add_entry(
        &self,
        org: OrganizationId,
        list_id: ComplianceListId,
        entity_type: String,
        value: String,
        reason: Option<String>,
    ) -> Result<ComplianceEntry> {
        self.get_list(org, list_id).await?;
        let entry = ComplianceEntry {
            id: ComplianceEntryId::new(),
            list_id,
            organization_id: org,
            entity_type,
            value,
            reason,
            added_at: Utc::now(),
        };
        let entry = self.repo.insert_entry(entry).await?;
        if let Some(cache) = self.cache {
            cache.invalidate(org);
        }
        Ok(entry)
    }

    pub async fn remove_entry(&self, org: OrganizationId, id: ComplianceEntryId) -> Result<()> {
        self.repo.remove_entry(org, id).await?;
        if let Some(cache) = self.cache {
            cache.invalidate(org);
        }
        Ok(())
    }

    /// Resolve list membership for every `(entity_type, value)` pair a
    /// transaction touches with a single batched query per entity type
    /// (spec §4.7), consulting the read-through cache first.
    pub async fn resolve_list_facts(
        &self,
        org: OrganizationId,
        candidates: &[(String, String)],
    ) -> Result<ListFacts> {
        if let Some(cache) = self.cache {
            if let Some(cached) = cache.get(org, candidates) {
                metrics::counter!("compliance_cache_hits_total", "cache" => "list_facts").increment(1);
                return Ok(cached);
            }
        }
        metrics::counter!("compliance_cache_misses_total", "cache" => "list_facts").increment(1);

        let mut by_type: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (entity_type, value) in candidates {
            by_type.entry(entity_type.as_str()).or_default().push(value.clone());
        }

        let mut matches: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (entity_type, values) in by_type {
            let hits = self.repo.batch_lookup(org, entity_type, &values).await?;
            let lists: Vec<String> = {
                let mut ids: Vec<String> = hits.iter().map(|e| e.list_id.to_string()).collect();
                ids.sort();
                ids.dedup();
                ids
            };
            if !lists.is_empty() {
                matches.insert(entity_type.to_string(), lists);
            }
        }

        let facts = ListFacts { matches };
        if let Some(cache) = self.cache {
            cache.put(org, candidates, facts.clone());
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_listed_false_when_entity_type_absent() {
        let facts = ListFacts::default();
        assert!(!facts.is_listed("counterparty_id"));
    }

    #[test]
    fn is_listed_true_when_matches_present() {
        let mut matches = BTreeMap::new();
        matches.insert("counterparty_id".to_string(), vec!["list-1".to_string()]);
        let facts = ListFacts { matches };
        assert!(facts.is_listed("counterparty_id"));
    }
}
