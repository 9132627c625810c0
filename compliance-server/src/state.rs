//! Application state

use compliance_core::cache::{ActiveRulesCache, ListFactsCache};
use compliance_core::config::EngineConfig;
use compliance_core::repository::traits::UnitOfWork;
use compliance_core::stream::StreamSink;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The persistence boundary evaluations run against.
    pub uow: Arc<dyn UnitOfWork>,

    /// Org-scoped cache of currently-active rule versions (spec §4.11).
    pub active_rules_cache: Arc<ActiveRulesCache>,

    /// Org-scoped cache of compliance-list membership lookups (spec §4.11).
    pub list_facts_cache: Arc<ListFactsCache>,

    /// Best-effort post-commit event sink (spec §4.10 step 8).
    pub stream: Arc<dyn StreamSink>,

    /// Resolved runtime configuration.
    pub config: Arc<EngineConfig>,

    /// Server start time
    pub start_time: Instant,

    /// Debug mode flag
    pub debug: bool,
}

impl AppState {
    /// Create new application state
    pub fn new(uow: Arc<dyn UnitOfWork>, stream: Arc<dyn StreamSink>, config: EngineConfig) -> Self {
        Self::with_debug(uow, stream, config, false)
    }

    /// Create application state with debug mode
    pub fn with_debug(
        uow: Arc<dyn UnitOfWork>,
        stream: Arc<dyn StreamSink>,
        config: EngineConfig,
        debug: bool,
    ) -> Self {
        let active_rules_cache = Arc::new(ActiveRulesCache::new(config.active_rules_cache_ttl));
        let list_facts_cache = Arc::new(ListFactsCache::new(config.list_facts_cache_ttl));
        Self {
            uow,
            active_rules_cache,
            list_facts_cache,
            stream,
            config: Arc::new(config),
            start_time: Instant::now(),
            debug,
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Build an [`compliance_core::pipeline::EvaluationContext`] borrowing
    /// from this state, for the duration of one request.
    pub fn evaluation_context(&self) -> compliance_core::pipeline::EvaluationContext<'_> {
        compliance_core::pipeline::EvaluationContext {
            uow: self.uow.as_ref(),
            active_rules_cache: &self.active_rules_cache,
            list_facts_cache: Some(&self.list_facts_cache),
            stream: self.stream.as_ref(),
            behavioral_lookback_days: self.config.behavioral_lookback_days,
            cold_start_threshold: self.config.cold_start_threshold,
            evaluation_deadline: self.config.evaluation_deadline,
        }
    }
}
