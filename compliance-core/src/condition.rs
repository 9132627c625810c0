//! The pure condition-tree evaluator (spec §4.1).
//!
//! `ConditionNode` is a tagged union: `All`, `Any`, `Not`, or a `Leaf`. The
//! evaluator never throws — ill-typed input folds to `false` (or `true` for
//! a vacuous `all`), so rule authors rely on [`crate::validator`] for
//! feedback rather than a runtime panic.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// A single node in a rule's condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionNode {
    /// True iff every child is true. Vacuously true when empty.
    All {
        /// Child nodes, ANDed together.
        all: Vec<ConditionNode>,
    },
    /// True iff at least one child is true. False when empty.
    Any {
        /// Child nodes, ORed together.
        any: Vec<ConditionNode>,
    },
    /// Negates exactly one child.
    Not {
        /// The single negated child.
        not: Box<ConditionNode>,
    },
    /// A leaf predicate over a single fact path.
    Leaf(Leaf),
}

/// A leaf predicate: `{fact, operator, value?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    /// Dot-notation path into the fact bundle.
    pub fact: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Expected value, absent for `exists`/`notExists`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
}

/// The supported leaf operators. Unknown operators never appear here —
/// they are rejected by `serde` at the deserialization boundary rather than
/// accepted and silently ignored, which would contradict spec §9's
/// "unknown operators are silently non-matching" note only at the point
/// where a tree is evaluated after having *already* been structurally
/// validated; raw untrusted JSON should go through [`crate::validator`]
/// first, which reports unsupported operators explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    In,
    NotIn,
    Contains,
    NotContains,
    Exists,
    NotExists,
    Between,
    Regex,
}

/// Evaluation trace mirroring the shape of a [`ConditionNode`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trace {
    /// Trace for an `all`/`any`/`not` combinator.
    Combinator {
        /// Which combinator produced this node ("all", "any", "not").
        combinator: &'static str,
        /// Whether the combinator as a whole was satisfied.
        satisfied: bool,
        /// Traces for each child, in order.
        children: Vec<Trace>,
    },
    /// Trace for a leaf predicate.
    Leaf {
        /// The fact path that was looked up.
        fact: String,
        /// The operator applied.
        operator: Operator,
        /// The expected value, if any.
        expected: Option<Json>,
        /// The actual value resolved from the fact bundle (`null` if absent).
        actual: Json,
        /// Whether the leaf was satisfied.
        satisfied: bool,
    },
}

impl Trace {
    /// Whether this trace node was satisfied.
    pub fn satisfied(&self) -> bool {
        match self {
            Trace::Combinator { satisfied, .. } => *satisfied,
            Trace::Leaf { satisfied, .. } => *satisfied,
        }
    }
}

/// Evaluate a condition tree against a fact bundle, returning only the
/// boolean verdict.
pub fn evaluate(node: &ConditionNode, facts: &Json) -> bool {
    match node {
        ConditionNode::All { all } => all.iter().all(|child| evaluate(child, facts)),
        ConditionNode::Any { any } => any.iter().any(|child| evaluate(child, facts)),
        ConditionNode::Not { not } => !evaluate(not, facts),
        ConditionNode::Leaf(leaf) => evaluate_leaf(leaf, facts),
    }
}

/// Evaluate a condition tree, additionally producing an isomorphic trace
/// tree for diagnostics.
pub fn evaluate_with_trace(node: &ConditionNode, facts: &Json) -> (bool, Trace) {
    match node {
        ConditionNode::All { all } => {
            let children: Vec<Trace> = all.iter().map(|c| evaluate_with_trace(c, facts).1).collect();
            let satisfied = children.iter().all(Trace::satisfied);
            (satisfied, Trace::Combinator { combinator: "all", satisfied, children })
        }
        ConditionNode::Any { any } => {
            let children: Vec<Trace> = any.iter().map(|c| evaluate_with_trace(c, facts).1).collect();
            let satisfied = children.iter().any(Trace::satisfied);
            (satisfied, Trace::Combinator { combinator: "any", satisfied, children })
        }
        ConditionNode::Not { not } => {
            let (child_satisfied, child_trace) = evaluate_with_trace(not, facts);
            let satisfied = !child_satisfied;
            (satisfied, Trace::Combinator { combinator: "not", satisfied, children: vec![child_trace] })
        }
        ConditionNode::Leaf(leaf) => {
            let actual = resolve_path(facts, &leaf.fact);
            let satisfied = apply_operator(leaf.operator, actual, leaf.value.as_ref());
            (
                satisfied,
                Trace::Leaf {
                    fact: leaf.fact.clone(),
                    operator: leaf.operator,
                    expected: leaf.value.clone(),
                    actual: actual.cloned().unwrap_or(Json::Null),
                    satisfied,
                },
            )
        }
    }
}

fn evaluate_leaf(leaf: &Leaf, facts: &Json) -> bool {
    let actual = resolve_path(facts, &leaf.fact);
    apply_operator(leaf.operator, actual, leaf.value.as_ref())
}

/// Walk dot-notation into `facts`. Any *intermediate* `null`, missing key,
/// or non-object collapses the rest of the lookup to undefined (`None`).
/// The final segment's value is returned as-is, so an explicit `null`
/// leaf value stays distinguishable from a wholly-missing one (spec §4.1:
/// `undefined ≠ null`).
fn resolve_path<'a>(facts: &'a Json, path: &str) -> Option<&'a Json> {
    let mut segments = path.split('.').peekable();
    let mut current = facts;
    while let Some(segment) = segments.next() {
        let Json::Object(map) = current else { return None };
        let Some(value) = map.get(segment) else { return None };
        if segments.peek().is_none() {
            return Some(value);
        }
        if value.is_null() {
            return None;
        }
        current = value;
    }
    Some(current)
}

fn apply_operator(op: Operator, actual: Option<&Json>, expected: Option<&Json>) -> bool {
    match op {
        Operator::Equal => actual.zip(expected).map(|(a, e)| a == e).unwrap_or(false),
        Operator::NotEqual => actual.zip(expected).map(|(a, e)| a != e).unwrap_or(true),
        Operator::GreaterThan => numeric_cmp(actual, expected, |a, b| a > b),
        Operator::GreaterThanOrEqual => numeric_cmp(actual, expected, |a, b| a >= b),
        Operator::LessThan => numeric_cmp(actual, expected, |a, b| a < b),
        Operator::LessThanOrEqual => numeric_cmp(actual, expected, |a, b| a <= b),
        Operator::In => expected
            .and_then(Json::as_array)
            .zip(actual)
            .map(|(arr, a)| arr.iter().any(|v| v == a))
            .unwrap_or(false),
        Operator::NotIn => expected
            .and_then(Json::as_array)
            .zip(actual)
            .map(|(arr, a)| !arr.iter().any(|v| v == a))
            .unwrap_or(false),
        Operator::Contains => string_contains(actual, expected),
        Operator::NotContains => !string_contains(actual, expected),
        Operator::Exists => actual.map(|v| !v.is_null()).unwrap_or(false),
        Operator::NotExists => actual.map(|v| v.is_null()).unwrap_or(true),
        Operator::Between => between(actual, expected),
        Operator::Regex => regex_match(actual, expected),
    }
}

fn numeric_cmp(actual: Option<&Json>, expected: Option<&Json>, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(Json::as_f64), expected.and_then(Json::as_f64)) {
        (Some(a), Some(e)) => cmp(a, e),
        _ => false,
    }
}

fn string_contains(actual: Option<&Json>, expected: Option<&Json>) -> bool {
    match (actual.and_then(Json::as_str), expected.and_then(Json::as_str)) {
        (Some(a), Some(e)) => a.contains(e),
        _ => false,
    }
}

fn between(actual: Option<&Json>, expected: Option<&Json>) -> bool {
    let Some(actual) = actual.and_then(Json::as_f64) else { return false };
    let Some(bounds) = expected.and_then(Json::as_array) else { return false };
    if bounds.len() != 2 {
        return false;
    }
    match (bounds[0].as_f64(), bounds[1].as_f64()) {
        (Some(min), Some(max)) => actual >= min && actual <= max,
        _ => false,
    }
}

fn regex_match(actual: Option<&Json>, expected: Option<&Json>) -> bool {
    let (Some(actual), Some(pattern)) = (actual.and_then(Json::as_str), expected.and_then(Json::as_str)) else {
        return false;
    };
    // Malformed patterns yield false, never an error (spec §4.1/§9). Regex
    // is intentionally unanchored.
    match regex::Regex::new(pattern) {
        Ok(re) => re.is_match(actual),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(fact: &str, operator: Operator, value: Option<Json>) -> ConditionNode {
        ConditionNode::Leaf(Leaf { fact: fact.to_string(), operator, value })
    }

    #[test]
    fn all_empty_is_vacuously_true() {
        let node = ConditionNode::All { all: vec![] };
        assert!(evaluate(&node, &json!({})));
    }

    #[test]
    fn any_empty_is_false() {
        let node = ConditionNode::Any { any: vec![] };
        assert!(!evaluate(&node, &json!({})));
    }

    #[test]
    fn not_negates_single_child() {
        let node = ConditionNode::Not {
            not: Box::new(leaf("transaction.amount", Operator::GreaterThan, Some(json!(10)))),
        };
        assert!(evaluate(&node, &json!({"transaction": {"amount": 5}})));
        assert!(!evaluate(&node, &json!({"transaction": {"amount": 50}})));
    }

    #[test]
    fn dotted_path_through_null_collapses_to_missing() {
        let node = leaf("transaction.country", Operator::Exists, None);
        assert!(!evaluate(&node, &json!({"transaction": {"country": null}})));
        assert!(!evaluate(&node, &json!({"transaction": {}})));
        assert!(!evaluate(&node, &json!({"other": 1})));
    }

    #[test]
    fn exists_is_true_for_falsy_but_present_values() {
        for v in [json!(0), json!(""), json!(false)] {
            let facts = json!({"x": v});
            assert!(evaluate(&leaf("x", Operator::Exists, None), &facts));
        }
    }

    #[test]
    fn numeric_comparisons_require_both_sides_numeric() {
        let node = leaf("x", Operator::GreaterThan, Some(json!(10)));
        assert!(evaluate(&node, &json!({"x": 11})));
        assert!(!evaluate(&node, &json!({"x": "11"})));
        assert!(!evaluate(&node, &json!({"x": 9})));
    }

    #[test]
    fn in_requires_array_and_strict_membership() {
        let node = leaf("transaction.type", Operator::In, Some(json!(["CASH_OUT", "DEBIT"])));
        assert!(evaluate(&node, &json!({"transaction": {"type": "CASH_OUT"}})));
        assert!(!evaluate(&node, &json!({"transaction": {"type": "CREDIT"}})));
    }

    #[test]
    fn between_is_inclusive_both_ends() {
        let node = leaf("x", Operator::Between, Some(json!([10, 20])));
        assert!(evaluate(&node, &json!({"x": 10})));
        assert!(evaluate(&node, &json!({"x": 20})));
        assert!(evaluate(&node, &json!({"x": 15})));
        assert!(!evaluate(&node, &json!({"x": 21})));
    }

    #[test]
    fn regex_is_unanchored_and_invalid_pattern_is_false() {
        let node = leaf("s", Operator::Regex, Some(json!("abc")));
        assert!(evaluate(&node, &json!({"s": "xxabcxx"})));

        let bad = leaf("s", Operator::Regex, Some(json!("(unclosed")));
        assert!(!evaluate(&bad, &json!({"s": "anything"})));
    }

    #[test]
    fn equal_distinguishes_undefined_from_null() {
        let node = leaf("x", Operator::Equal, Some(Json::Null));
        // `x` missing entirely is undefined, not null — per spec §4.1
        // `undefined ≠ null`, so this must not match.
        assert!(!evaluate(&node, &json!({})));
        // An explicit null value, by contrast, does equal null.
        assert!(evaluate(&node, &json!({"x": null})));
    }

    #[test]
    fn determinism_same_inputs_same_output() {
        let node = ConditionNode::All {
            all: vec![
                leaf("transaction.amount", Operator::GreaterThan, Some(json!(10000))),
                leaf("transaction.type", Operator::In, Some(json!(["CASH_OUT", "DEBIT"]))),
            ],
        };
        let facts = json!({"transaction": {"amount": 15000, "type": "CASH_OUT"}});
        let r1 = evaluate(&node, &facts);
        let r2 = evaluate(&node, &facts);
        assert_eq!(r1, r2);
        assert!(r1);
    }

    #[test]
    fn trace_mirrors_tree_shape() {
        let node = ConditionNode::All {
            all: vec![leaf("x", Operator::Equal, Some(json!(1)))],
        };
        let (satisfied, trace) = evaluate_with_trace(&node, &json!({"x": 1}));
        assert!(satisfied);
        match trace {
            Trace::Combinator { combinator, satisfied, children } => {
                assert_eq!(combinator, "all");
                assert!(satisfied);
                assert_eq!(children.len(), 1);
            }
            _ => panic!("expected combinator trace"),
        }
    }
}
