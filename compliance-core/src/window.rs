//! Deterministic sliding-window bounds and aggregation (spec §4.3).
//!
//! Everything here is a pure function of its inputs — wall-clock is never
//! consulted. `anchor` is always the transaction's own `datetime`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// `{duration, unit}` sliding-window specification (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    /// Positive window length in `unit`s.
    pub duration: u32,
    /// The unit `duration` is expressed in.
    pub unit: WindowUnit,
}

/// Units a [`WindowSpec`] may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    Minutes,
    Hours,
    Days,
}

impl WindowSpec {
    /// Render a stable key suitable for deduplicating identical window
    /// specs across active rules (e.g. `"24hours"`).
    pub fn dedup_fragment(&self) -> String {
        let unit = match self.unit {
            WindowUnit::Minutes => "minutes",
            WindowUnit::Hours => "hours",
            WindowUnit::Days => "days",
        };
        format!("{}{}", self.duration, unit)
    }

    fn to_chrono_duration(self) -> ChronoDuration {
        match self.unit {
            WindowUnit::Minutes => ChronoDuration::minutes(self.duration as i64),
            WindowUnit::Hours => ChronoDuration::hours(self.duration as i64),
            WindowUnit::Days => ChronoDuration::days(self.duration as i64),
        }
    }
}

/// `[start, end)` bounds for a sliding window anchored to a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound — always equal to `anchor`.
    pub end: DateTime<Utc>,
}

/// Compute `[anchor − duration, anchor)` for `window`.
pub fn compute_bounds(anchor: DateTime<Utc>, window: WindowSpec) -> WindowBounds {
    WindowBounds { start: anchor - window.to_chrono_duration(), end: anchor }
}

/// Keep only timestamps within `[start, end)` of the window anchored at
/// `anchor` — inclusive start, exclusive end, so the anchor transaction
/// itself is never counted in its own window (spec §4.3, §8 invariant 5).
pub fn filter_in_window<'a, T>(
    rows: &'a [T],
    anchor: DateTime<Utc>,
    window: WindowSpec,
    datetime_of: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<&'a T> {
    let bounds = compute_bounds(anchor, window);
    rows.iter().filter(|r| { let dt = datetime_of(r); dt >= bounds.start && dt < bounds.end }).collect()
}

/// `COUNT` over a filtered row set — 0 on empty.
pub fn agg_count<T>(rows: &[T]) -> i64 {
    rows.len() as i64
}

/// `SUM` over a filtered row set — 0 on empty.
pub fn agg_sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// `AVG` over a filtered row set — `None` on empty.
pub fn agg_avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `MAX` over a filtered row set — `None` on empty.
pub fn agg_max(values: &[f64]) -> Option<f64> {
    values.iter().copied().fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// `MIN` over a filtered row set — `None` on empty.
pub fn agg_min(values: &[f64]) -> Option<f64> {
    values.iter().copied().fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
}

/// Quantize a timestamp to the ISO-8601 UTC boundary of the dedup bucket
/// for `window` (or the default calendar-day bucket when `window` is
/// `None` — spec §4.3/§9).
pub fn dedup_bucket_start(t: DateTime<Utc>, window: Option<WindowSpec>) -> DateTime<Utc> {
    let bucket_ms = match window {
        Some(w) => w.to_chrono_duration().num_milliseconds().max(1),
        None => ChronoDuration::days(1).num_milliseconds(),
    };
    let t_ms = t.timestamp_millis();
    let floored = t_ms.div_euclid(bucket_ms) * bucket_ms;
    DateTime::from_timestamp_millis(floored).unwrap_or(t)
}

/// Render [`dedup_bucket_start`] as an ISO-8601 UTC string for use in a
/// dedup key.
pub fn dedup_bucket_start_iso(t: DateTime<Utc>, window: Option<WindowSpec>) -> String {
    dedup_bucket_start(t, window).to_rfc3339()
}
