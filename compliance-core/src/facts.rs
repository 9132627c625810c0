//! Fact bundle assembly (spec §4.10): the `{transaction, aggregation,
//! lists, behavior, deviation}` object the evaluation engine's condition
//! trees are evaluated against.

use crate::behavior::{BehavioralBaseline, Deviation};
use crate::lists::ListFacts;
use crate::model::Transaction;
use crate::window::{agg_avg, agg_count, agg_max, agg_min, agg_sum, filter_in_window, WindowSpec};
use serde_json::{json, Value as Json};

/// Per-window aggregates computed over a single account's transaction
/// history, keyed flat as `count_<dur><unit>`, `sum_amount_<dur><unit>`,
/// `avg_amount_<dur><unit>`, `max_amount_<dur><unit>`, `min_amount_<dur><unit>`,
/// and `count_by_type_<dur><unit>` (a map of transaction type to count) —
/// the exact path schema rule authors reference (spec §4.10 step 4(a)).
/// Windows are deduplicated by [`WindowSpec::dedup_fragment`] so two rules
/// sharing a window spec share one computation.
pub fn build_aggregation_facts(history: &[Transaction], anchor: chrono::DateTime<chrono::Utc>, windows: &[WindowSpec]) -> Json {
    let mut out = serde_json::Map::new();
    let mut seen = std::collections::HashSet::new();
    for window in windows {
        let fragment = window.dedup_fragment();
        if !seen.insert(fragment.clone()) {
            continue;
        }
        let in_window = filter_in_window(history, anchor, *window, |t| t.datetime);
        let amounts: Vec<f64> = in_window.iter().map(|t| t.amount).collect();

        let mut by_type: std::collections::BTreeMap<&str, u64> = std::collections::BTreeMap::new();
        for t in &in_window {
            *by_type.entry(t.transaction_type.as_str()).or_default() += 1;
        }

        out.insert(format!("count_{fragment}"), json!(agg_count(&in_window)));
        out.insert(format!("sum_amount_{fragment}"), json!(agg_sum(&amounts)));
        out.insert(format!("avg_amount_{fragment}"), json!(agg_avg(&amounts)));
        out.insert(format!("max_amount_{fragment}"), json!(agg_max(&amounts)));
        out.insert(format!("min_amount_{fragment}"), json!(agg_min(&amounts)));
        out.insert(format!("count_by_type_{fragment}"), json!(by_type));
    }
    Json::Object(out)
}

/// Assemble the full fact bundle a condition tree evaluates against.
pub fn build_fact_bundle(
    transaction: &Transaction,
    aggregation: Json,
    lists: &ListFacts,
    behavior: &BehavioralBaseline,
    deviation: &Deviation,
) -> serde_json::Result<Json> {
    Ok(json!({
        "transaction": serde_json::to_value(transaction)?,
        "aggregation": aggregation,
        "lists": serde_json::to_value(&lists.matches)?,
        "behavior": serde_json::to_value(behavior)?,
        "deviation": serde_json::to_value(deviation)?,
    }))
}

/// Candidate `(entity_type, value)` pairs worth resolving against
/// compliance lists for this transaction (spec §4.7) — every identifying
/// field that is actually present.
pub fn list_lookup_candidates(transaction: &Transaction) -> Vec<(String, String)> {
    let mut candidates = Vec::new();
    if let Some(counterparty) = &transaction.counterparty_id {
        candidates.push(("counterparty_id".to_string(), counterparty.clone()));
    }
    if let Some(country) = &transaction.country {
        candidates.push(("country".to_string(), country.clone()));
    }
    candidates.push(("account_id".to_string(), transaction.account_id.to_string()));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{BehavioralBaseline, Deviation};
    use crate::types::{AccountId, OrganizationId, TransactionId};
    use chrono::Utc;

    fn sample_transaction() -> Transaction {
        Transaction {
            id: TransactionId::new(),
            organization_id: OrganizationId::new(),
            account_id: AccountId::new(),
            transaction_type: "CASH_OUT".into(),
            amount: 5000.0,
            currency: "USD".into(),
            amount_normalized: None,
            currency_normalized: None,
            datetime: Utc::now(),
            country: Some("US".into()),
            counterparty_id: Some("cp-1".into()),
            channel: Some("MOBILE".into()),
            subtype: None,
            quantity: None,
            asset: None,
            price: None,
            origin: None,
            data: Json::Null,
            metadata: Json::Null,
            created_by: None,
        }
    }

    #[test]
    fn fact_bundle_has_the_five_top_level_sections() {
        let transaction = sample_transaction();
        let baseline = BehavioralBaseline {
            history_count: 0,
            avg_amount: 0.0,
            std_amount: 0.0,
            typical_countries: vec![],
            typical_channels: vec![],
            avg_frequency_per_day: 0.0,
            is_cold_start: true,
        };
        let deviation = Deviation {
            amount_ratio: None,
            amount_z_score: None,
            is_new_country: true,
            is_new_channel: true,
            is_cold_start: true,
        };
        let bundle = build_fact_bundle(&transaction, json!({}), &ListFacts::default(), &baseline, &deviation).unwrap();
        for key in ["transaction", "aggregation", "lists", "behavior", "deviation"] {
            assert!(bundle.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn list_lookup_candidates_include_account_and_counterparty_and_country() {
        let transaction = sample_transaction();
        let candidates = list_lookup_candidates(&transaction);
        assert!(candidates.iter().any(|(t, _)| t == "counterparty_id"));
        assert!(candidates.iter().any(|(t, _)| t == "country"));
        assert!(candidates.iter().any(|(t, _)| t == "account_id"));
    }
}
