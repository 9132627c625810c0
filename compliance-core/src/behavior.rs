//! Behavioral Baseline Service (spec §4.8): per-account history rollups
//! and the deviation facts computed against them.

use crate::model::Transaction;
use crate::repository::traits::TransactionRepository;
use crate::types::{AccountId, OrganizationId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An account's rolled-up transaction history over the lookback window
/// (spec §4.8). Always computable — an account with no history yields a
/// baseline with `is_cold_start: true` and zeroed/empty aggregates rather
/// than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralBaseline {
    pub history_count: i64,
    pub avg_amount: f64,
    pub std_amount: f64,
    pub typical_countries: Vec<String>,
    pub typical_channels: Vec<String>,
    pub avg_frequency_per_day: f64,
    pub is_cold_start: bool,
}

/// How a specific transaction deviates from the account's baseline
/// (spec §4.8). `amount_ratio` / `amount_z_score` are `None` during cold
/// start — there isn't enough history to make either number meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deviation {
    pub amount_ratio: Option<f64>,
    pub amount_z_score: Option<f64>,
    pub is_new_country: bool,
    pub is_new_channel: bool,
    pub is_cold_start: bool,
}

pub struct BehavioralBaselineService<'a> {
    transactions: &'a dyn TransactionRepository,
    lookback_days: i64,
    cold_start_threshold: i64,
}

impl<'a> BehavioralBaselineService<'a> {
    pub fn new(transactions: &'a dyn TransactionRepository, lookback_days: i64, cold_start_threshold: i64) -> Self {
        Self { transactions, lookback_days, cold_start_threshold }
    }

    /// Load `account`'s history over the lookback window ending at
    /// `anchor` (the transaction being evaluated's own `datetime`, never
    /// wall-clock — spec §4.8/§5) and compute its baseline.
    pub async fn compute_baseline(
        &self,
        org: OrganizationId,
        account: AccountId,
        anchor: DateTime<Utc>,
    ) -> crate::error::Result<BehavioralBaseline> {
        let start = anchor - Duration::days(self.lookback_days);
        let history = self.transactions.list_for_account_in_range(org, account, start, anchor).await?;
        Ok(baseline_from_history(&history, anchor, self.lookback_days, self.cold_start_threshold))
    }

    /// Compute how `transaction` deviates from `baseline`.
    pub fn compute_deviation(&self, transaction: &Transaction, baseline: &BehavioralBaseline) -> Deviation {
        deviation_from_baseline(transaction, baseline)
    }
}

/// Pure computation over an already-loaded history slice — the service
/// method above is a thin wrapper that fetches `history` first; callers
/// that already hold a history slice (e.g. the evaluation pipeline,
/// which fans this fetch out alongside list-fact resolution) should call
/// this directly instead of going through the repository a second time.
pub fn baseline_from_history(
    history: &[Transaction],
    anchor: DateTime<Utc>,
    lookback_days: i64,
    cold_start_threshold: i64,
) -> BehavioralBaseline {
    let history_count = history.len() as i64;
    let is_cold_start = history_count < cold_start_threshold;

    let amounts: Vec<f64> = history.iter().map(|t| t.amount).collect();
    let avg_amount = mean(&amounts);
    let std_amount = std_dev(&amounts, avg_amount);

    let typical_countries: Vec<String> = history
        .iter()
        .filter_map(|t| t.country.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let typical_channels: Vec<String> = history
        .iter()
        .filter_map(|t| t.channel.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let avg_frequency_per_day = if history_count == 0 {
        0.0
    } else {
        round4(history_count as f64 / lookback_days.max(1) as f64)
    };

    BehavioralBaseline {
        history_count,
        avg_amount,
        std_amount,
        typical_countries,
        typical_channels,
        avg_frequency_per_day,
        is_cold_start,
    }
}

/// Pure deviation computation — see [`baseline_from_history`] on why the
/// pipeline calls this directly rather than through the service.
pub fn deviation_from_baseline(transaction: &Transaction, baseline: &BehavioralBaseline) -> Deviation {
    // Deviation metrics are computed whenever the baseline itself supports
    // them, independent of cold start — `isColdStart` only flags low
    // confidence in the result, it doesn't suppress it (spec §4.8, glossary).
    let amount_ratio =
        if baseline.avg_amount > 0.0 { Some(transaction.amount / baseline.avg_amount) } else { None };
    let amount_z_score = if baseline.std_amount > 0.0 {
        Some((transaction.amount - baseline.avg_amount) / baseline.std_amount)
    } else {
        None
    };

    let is_new_country = transaction
        .country
        .as_ref()
        .is_some_and(|c| !baseline.typical_countries.iter().any(|t| t == c));
    let is_new_channel = transaction
        .channel
        .as_ref()
        .is_some_and(|c| !baseline.typical_channels.iter().any(|t| t == c));

    Deviation {
        amount_ratio,
        amount_z_score,
        is_new_country,
        is_new_channel,
        is_cold_start: baseline.is_cold_start,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        0.0
    } else {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
