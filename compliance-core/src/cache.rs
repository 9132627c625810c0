//! Read-through caches (spec §4.11): active rules and list-facts lookups,
//! both org-scoped, both best-effort. A cache outage degrades to a direct
//! repository read rather than failing the request.

use crate::lists::ListFacts;
use crate::rules::version::RuleVersion;
use crate::types::OrganizationId;
use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

impl<T> Entry<T> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// Caches each org's currently-active rule set.
pub struct ActiveRulesCache {
    ttl: Duration,
    entries: DashMap<OrganizationId, Entry<Vec<RuleVersion>>>,
}

impl ActiveRulesCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: DashMap::new() }
    }

    pub fn get(&self, org: OrganizationId) -> Option<Vec<RuleVersion>> {
        let entry = self.entries.get(&org)?;
        if entry.is_fresh(self.ttl) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn put(&self, org: OrganizationId, versions: Vec<RuleVersion>) {
        self.entries.insert(org, Entry { value: versions, inserted_at: Instant::now() });
    }

    /// Drop the cached set for `org` — called on any write to a template
    /// or version in that org so the next read repopulates from the
    /// repository (spec §4.11 invalidation-on-write).
    pub fn invalidate(&self, org: OrganizationId) {
        self.entries.remove(&org);
    }
}

/// Caches resolved [`ListFacts`] for a given org and candidate set.
pub struct ListFactsCache {
    ttl: Duration,
    entries: DashMap<(OrganizationId, u64), Entry<ListFacts>>,
}

impl ListFactsCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: DashMap::new() }
    }

    fn key_for(candidates: &[(String, String)]) -> u64 {
        let mut sorted: Vec<&(String, String)> = candidates.iter().collect();
        sorted.sort();
        let mut hasher = AHasher::default();
        for (entity_type, value) in sorted {
            entity_type.hash(&mut hasher);
            value.hash(&mut hasher);
        }
        hasher.finish()
    }

    pub fn get(&self, org: OrganizationId, candidates: &[(String, String)]) -> Option<ListFacts> {
        let key = (org, Self::key_for(candidates));
        let entry = self.entries.get(&key)?;
        if entry.is_fresh(self.ttl) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn put(&self, org: OrganizationId, candidates: &[(String, String)], facts: ListFacts) {
        let key = (org, Self::key_for(candidates));
        self.entries.insert(key, Entry { value: facts, inserted_at: Instant::now() });
    }

    /// Drop every cached entry for `org` — coarse-grained, but a single
    /// list mutation can change membership for any candidate set, so a
    /// per-key invalidation would require tracking reverse indices for no
    /// real benefit at this cache's size (spec §4.11).
    pub fn invalidate(&self, org: OrganizationId) {
        self.entries.retain(|(o, _), _| *o != org);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_rules_cache_expires_after_ttl() {
        let cache = ActiveRulesCache::new(Duration::from_millis(0));
        let org = OrganizationId::new();
        cache.put(org, vec![]);
        std::thread::sleep(Duration::from_millis(2));
        assert!(cache.get(org).is_none());
    }

    #[test]
    fn list_facts_cache_key_ignores_candidate_order() {
        let a = vec![("country".to_string(), "US".to_string()), ("counterparty_id".to_string(), "c1".to_string())];
        let b = vec![("counterparty_id".to_string(), "c1".to_string()), ("country".to_string(), "US".to_string())];
        assert_eq!(ListFactsCache::key_for(&a), ListFactsCache::key_for(&b));
    }

    #[test]
    fn list_facts_cache_invalidate_clears_only_target_org() {
        let cache = ListFactsCache::new(Duration::from_secs(60));
        let org_a = OrganizationId::new();
        let org_b = OrganizationId::new();
        let candidates = vec![("country".to_string(), "US".to_string())];
        cache.put(org_a, &candidates, ListFacts::default());
        cache.put(org_b, &candidates, ListFacts::default());
        cache.invalidate(org_a);
        assert!(cache.get(org_a, &candidates).is_none());
        assert!(cache.get(org_b, &candidates).is_some());
    }
}
