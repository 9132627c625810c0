//! Pre-persistence structural validator for condition trees (spec §4.2).
//!
//! Runs before a [`crate::rules::version::RuleVersion`] is persisted and
//! again after inheritance merging. Unlike the evaluator, this layer is
//! meant to give rule authors feedback, so it reports every problem it
//! finds rather than failing on the first one.

use crate::condition::Operator;
use serde_json::Value as Json;

/// Outcome of validating a condition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Whether the tree is structurally valid.
    pub valid: bool,
    /// JSON-pointer-like paths to each problem found, most specific first
    /// within a branch but otherwise in tree-walk order.
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        ValidationOutcome { valid: true, errors: Vec::new() }
    }
}

/// Validate a raw condition tree (as deserialized from persisted/incoming
/// JSON, before it is trusted as a [`crate::condition::ConditionNode`]).
pub fn validate(root: &Json) -> ValidationOutcome {
    let mut errors = Vec::new();
    validate_node(root, "$", &mut errors);
    ValidationOutcome { valid: errors.is_empty(), errors }
}

const SUPPORTED_OPERATORS: &[&str] = &[
    "equal",
    "notEqual",
    "greaterThan",
    "greaterThanOrEqual",
    "lessThan",
    "lessThanOrEqual",
    "in",
    "notIn",
    "contains",
    "notContains",
    "exists",
    "notExists",
    "between",
    "regex",
];

fn validate_node(node: &Json, path: &str, errors: &mut Vec<String>) {
    let Json::Object(map) = node else {
        errors.push(format!("{path}: node must be an object"));
        return;
    };

    let has_all = map.contains_key("all");
    let has_any = map.contains_key("any");
    let has_not = map.contains_key("not");
    let has_leaf_shape = map.contains_key("fact") || map.contains_key("operator") || map.contains_key("value");

    let declared = [has_all, has_any, has_not, has_leaf_shape].iter().filter(|b| **b).count();
    if declared != 1 {
        errors.push(format!(
            "{path}: node must declare exactly one of all/any/not/leaf, found {declared}"
        ));
        return;
    }

    if has_all {
        validate_combinator(map.get("all"), "all", path, errors);
    } else if has_any {
        validate_combinator(map.get("any"), "any", path, errors);
    } else if has_not {
        match map.get("not") {
            Some(child) => validate_node(child, &format!("{path}.not"), errors),
            None => errors.push(format!("{path}.not: missing child")),
        }
    } else {
        validate_leaf(map, path, errors);
    }
}

fn validate_combinator(value: Option<&Json>, key: &str, path: &str, errors: &mut Vec<String>) {
    match value.and_then(Json::as_array) {
        Some(children) if !children.is_empty() => {
            for (i, child) in children.iter().enumerate() {
                validate_node(child, &format!("{path}.{key}[{i}]"), errors);
            }
        }
        Some(_) => errors.push(format!("{path}.{key}: array must be non-empty")),
        None => errors.push(format!("{path}.{key}: must be an array")),
    }
}

fn validate_leaf(map: &serde_json::Map<String, Json>, path: &str, errors: &mut Vec<String>) {
    let fact_ok = matches!(map.get("fact"), Some(Json::String(s)) if !s.is_empty());
    if !fact_ok {
        errors.push(format!("{path}.fact: required non-empty string"));
    }

    let operator = map.get("operator").and_then(Json::as_str);
    let Some(operator) = operator else {
        errors.push(format!("{path}.operator: required string"));
        return;
    };
    if !SUPPORTED_OPERATORS.contains(&operator) {
        errors.push(format!("{path}.operator: unsupported operator '{operator}'"));
        return;
    }

    let value = map.get("value");
    validate_operator_shape(operator, value, path, errors);
}

fn validate_operator_shape(operator: &str, value: Option<&Json>, path: &str, errors: &mut Vec<String>) {
    match operator {
        "exists" | "notExists" => {
            if value.is_some() {
                errors.push(format!("{path}.value: must be absent for {operator}"));
            }
        }
        "in" | "notIn" => match value.and_then(Json::as_array) {
            Some(arr) if !arr.is_empty() => {}
            Some(_) => errors.push(format!("{path}.value: {operator} requires a non-empty array")),
            None => errors.push(format!("{path}.value: {operator} requires an array")),
        },
        "between" => match value.and_then(Json::as_array) {
            Some(arr) if arr.len() == 2 && arr.iter().all(Json::is_number) => {}
            _ => errors.push(format!("{path}.value: between requires a two-element numeric array")),
        },
        "regex" => {
            if !matches!(value, Some(Json::String(_))) {
                errors.push(format!("{path}.value: regex requires a string pattern"));
            }
        }
        "greaterThan" | "greaterThanOrEqual" | "lessThan" | "lessThanOrEqual" => {
            if !matches!(value, Some(v) if v.is_number()) {
                errors.push(format!("{path}.value: {operator} requires a numeric value"));
            }
        }
        "contains" | "notContains" => {
            if !matches!(value, Some(Json::String(_))) {
                errors.push(format!("{path}.value: {operator} requires a string value"));
            }
        }
        "equal" | "notEqual" => {
            if value.is_none() {
                errors.push(format!("{path}.value: {operator} requires a defined value"));
            }
        }
        other => errors.push(format!("{path}.operator: unsupported operator '{other}'")),
    }
}

/// The authoritative operator set, exposed so callers (e.g. a UI rule
/// builder) can list what's supported without duplicating the list.
pub fn supported_operators() -> &'static [&'static str] {
    SUPPORTED_OPERATORS
}

/// Parse `Operator` from its wire name; used to cross-check the validator's
/// operator list stays in sync with [`crate::condition::Operator`].
pub fn operator_from_str(s: &str) -> Option<Operator> {
    serde_json::from_value(Json::String(s.to_string())).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_empty_array_is_invalid() {
        let outcome = validate(&json!({"all": []}));
        assert!(!outcome.valid);
    }

    #[test]
    fn any_empty_array_is_invalid() {
        let outcome = validate(&json!({"any": []}));
        assert!(!outcome.valid);
    }

    #[test]
    fn well_formed_tree_is_valid() {
        let tree = json!({
            "all": [
                {"fact": "transaction.amount", "operator": "greaterThan", "value": 10000},
                {"any": [
                    {"fact": "transaction.type", "operator": "in", "value": ["CASH_OUT", "DEBIT"]},
                    {"not": {"fact": "transaction.country", "operator": "exists"}}
                ]}
            ]
        });
        let outcome = validate(&tree);
        assert!(outcome.valid, "errors: {:?}", outcome.errors);
    }

    #[test]
    fn exists_forbids_value() {
        let outcome = validate(&json!({"fact": "x", "operator": "exists", "value": 1}));
        assert!(!outcome.valid);
    }

    #[test]
    fn in_requires_non_empty_array() {
        assert!(!validate(&json!({"fact": "x", "operator": "in", "value": []})).valid);
        assert!(!validate(&json!({"fact": "x", "operator": "in", "value": "nope"})).valid);
        assert!(validate(&json!({"fact": "x", "operator": "in", "value": [1]})).valid);
    }

    #[test]
    fn between_requires_two_numeric_elements() {
        assert!(!validate(&json!({"fact": "x", "operator": "between", "value": [1]})).valid);
        assert!(!validate(&json!({"fact": "x", "operator": "between", "value": [1, "a"]})).valid);
        assert!(validate(&json!({"fact": "x", "operator": "between", "value": [1, 10]})).valid);
    }

    #[test]
    fn regex_requires_string_pattern() {
        assert!(!validate(&json!({"fact": "x", "operator": "regex", "value": 1})).valid);
        assert!(validate(&json!({"fact": "x", "operator": "regex", "value": "abc"})).valid);
    }

    #[test]
    fn unknown_operator_is_rejected_at_validation_time() {
        let outcome = validate(&json!({"fact": "x", "operator": "bogus"}));
        assert!(!outcome.valid);
    }

    #[test]
    fn node_declaring_two_shapes_is_invalid() {
        let outcome = validate(&json!({"all": [{"fact": "x", "operator": "exists"}], "any": []}));
        assert!(!outcome.valid);
    }

    #[test]
    fn non_object_node_is_invalid() {
        assert!(!validate(&json!([1, 2, 3])).valid);
        assert!(!validate(&json!(null)).valid);
    }
}
