//! Runtime configuration, read from the environment (spec SPEC_FULL
//! "Configuration"). No config-file crate — every knob is an env var with
//! a sane default, read once at startup.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub active_rules_cache_ttl: Duration,
    pub list_facts_cache_ttl: Duration,
    pub behavioral_lookback_days: i64,
    pub cold_start_threshold: i64,
    pub max_inheritance_depth: usize,
    pub evaluation_deadline: Duration,
    pub otel_enabled: bool,
}

impl EngineConfig {
    /// Load from the environment, falling back to documented defaults for
    /// anything unset. Only `DATABASE_URL` is required.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            database_url,
            active_rules_cache_ttl: Duration::from_secs(env_u64("ACTIVE_RULES_CACHE_TTL_SECS", 60)),
            list_facts_cache_ttl: Duration::from_secs(env_u64("LIST_FACTS_CACHE_TTL_SECS", 30)),
            behavioral_lookback_days: env_u64("BEHAVIORAL_LOOKBACK_DAYS", 30) as i64,
            cold_start_threshold: env_u64("COLD_START_THRESHOLD", 5) as i64,
            max_inheritance_depth: env_u64("MAX_INHERITANCE_DEPTH", 10) as usize,
            evaluation_deadline: Duration::from_millis(env_u64("EVALUATION_DEADLINE_MS", 2000)),
            otel_enabled: env_bool("OTEL_ENABLED", false),
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
