//! Transaction Evaluation Engine (spec §4.9) — pure: given a rule set and
//! a fact bundle, compute a decision. No I/O, no clock, no persistence.

use crate::condition::evaluate;
use crate::error::{ComplianceError, Result};
use crate::model::{ActionDefinition, ActionType, RuleOutcome};
use crate::rules::version::{parse_effective_conditions, RuleVersion};
use crate::types::Decision;
use serde_json::Value as Json;

/// Result of evaluating one transaction's fact bundle against a rule set.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub decision: Decision,
    /// Outcomes for rules whose conditions were satisfied, in the same
    /// (priority, id) order the rules were supplied in.
    pub triggered_rules: Vec<RuleOutcome>,
    /// Outcomes for every rule considered, satisfied or not.
    pub all_rule_results: Vec<RuleOutcome>,
    /// Every action attached to a triggered rule, flattened in rule order.
    pub actions: Vec<ActionDefinition>,
}

/// Evaluate `facts` against `rules`. `rules` is expected to already be the
/// output of [`crate::rules::selector::select_for_evaluation`] — this
/// function does not filter on activation state itself, it only evaluates
/// whatever it is given, in the order given.
pub fn evaluate_transaction(rules: &[&RuleVersion], facts: &Json) -> Result<EngineOutput> {
    let mut all_rule_results = Vec::with_capacity(rules.len());
    let mut triggered_rules = Vec::new();
    let mut actions = Vec::new();
    let mut decision = Decision::Allow;

    for rule in rules {
        let tree = parse_effective_conditions(rule).map_err(|e| {
            ComplianceError::business_rule(
                "MALFORMED_CONDITION_TREE",
                format!("rule version {} has an unparseable condition tree: {e}", rule.id),
            )
        })?;
        let satisfied = evaluate(&tree, facts);

        let outcome = RuleOutcome { rule_version_id: rule.id, priority: rule.priority, satisfied };
        all_rule_results.push(outcome.clone());

        if satisfied {
            triggered_rules.push(outcome);
            for action in &rule.actions {
                decision = decision.combine(decision_for_action(action));
                actions.push(action.clone());
            }
        }
    }

    Ok(EngineOutput { decision, triggered_rules, all_rule_results, actions })
}

fn decision_for_action(action: &ActionDefinition) -> Decision {
    match action.action_type {
        ActionType::BlockTransaction => Decision::Block,
        ActionType::CreateAlert | ActionType::Webhook | ActionType::PublishQueue => Decision::Review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrganizationId, RuleTemplateId, RuleVersionId};
    use chrono::Utc;
    use serde_json::json;

    fn rule_version(conditions: Json, actions: Vec<ActionDefinition>, priority: i32) -> RuleVersion {
        let now = Utc::now();
        RuleVersion {
            id: RuleVersionId::new(),
            template_id: RuleTemplateId::new(),
            organization_id: OrganizationId::new(),
            version: 1,
            parent_version_id: None,
            conditions: conditions.clone(),
            effective_conditions: conditions,
            actions,
            priority,
            window: None,
            enabled: true,
            created_at: now,
            created_by: None,
            active_at: Some(now),
            deactivated_at: None,
        }
    }

    fn alert_action() -> ActionDefinition {
        serde_json::from_value(json!({"type": "create_alert", "severity": "high"})).unwrap()
    }

    fn block_action() -> ActionDefinition {
        serde_json::from_value(json!({"type": "block_transaction"})).unwrap()
    }

    #[test]
    fn no_triggered_rules_yields_allow() {
        let facts = json!({"transaction": {"amount": 10}});
        let rule = rule_version(json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}), vec![alert_action()], 1);
        let out = evaluate_transaction(&[&rule], &facts).unwrap();
        assert_eq!(out.decision, Decision::Allow);
        assert!(out.triggered_rules.is_empty());
        assert_eq!(out.all_rule_results.len(), 1);
    }

    #[test]
    fn triggered_create_alert_yields_review() {
        let facts = json!({"transaction": {"amount": 5000}});
        let rule = rule_version(json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}), vec![alert_action()], 1);
        let out = evaluate_transaction(&[&rule], &facts).unwrap();
        assert_eq!(out.decision, Decision::Review);
        assert_eq!(out.triggered_rules.len(), 1);
        assert_eq!(out.actions.len(), 1);
    }

    #[test]
    fn block_action_beats_review_regardless_of_rule_order() {
        let facts = json!({"transaction": {"amount": 5000}});
        let review_rule = rule_version(json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}), vec![alert_action()], 1);
        let block_rule = rule_version(json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}), vec![block_action()], 2);
        let out = evaluate_transaction(&[&review_rule, &block_rule], &facts).unwrap();
        assert_eq!(out.decision, Decision::Block);
        assert_eq!(out.triggered_rules.len(), 2);
    }

    #[test]
    fn all_rule_results_include_non_triggered_rules() {
        let facts = json!({"transaction": {"amount": 10}});
        let satisfied = rule_version(json!({"fact": "transaction.amount", "operator": "lessThan", "value": 1000}), vec![], 1);
        let unsatisfied = rule_version(json!({"fact": "transaction.amount", "operator": "greaterThan", "value": 1000}), vec![], 2);
        let out = evaluate_transaction(&[&satisfied, &unsatisfied], &facts).unwrap();
        assert_eq!(out.all_rule_results.len(), 2);
        assert_eq!(out.triggered_rules.len(), 1);
    }
}
