//! Property-based tests for the condition evaluator: evaluation must be a
//! pure function of (tree, facts), independent of call count or ordering.

use compliance_core::condition::{evaluate, ConditionNode, Leaf, Operator};
use proptest::prelude::*;
use serde_json::{json, Value as Json};

fn arb_operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Equal),
        Just(Operator::NotEqual),
        Just(Operator::GreaterThan),
        Just(Operator::GreaterThanOrEqual),
        Just(Operator::LessThan),
        Just(Operator::LessThanOrEqual),
        Just(Operator::In),
        Just(Operator::NotIn),
        Just(Operator::Contains),
        Just(Operator::NotContains),
        Just(Operator::Exists),
        Just(Operator::NotExists),
    ]
}

fn arb_leaf() -> impl Strategy<Value = ConditionNode> {
    (
        prop_oneof![Just("amount"), Just("transaction_type"), Just("account.risk_score"), Just("missing.path")],
        arb_operator(),
        prop_oneof![
            any::<i64>().prop_map(|n| Some(json!(n))),
            any::<bool>().prop_map(|b| Some(json!(b))),
            Just(None),
        ],
    )
        .prop_map(|(fact, operator, value)| ConditionNode::Leaf(Leaf { fact: fact.to_string(), operator, value }))
}

fn arb_tree() -> impl Strategy<Value = ConditionNode> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|all| ConditionNode::All { all }),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|any| ConditionNode::Any { any }),
            inner.prop_map(|not| ConditionNode::Not { not: Box::new(not) }),
        ]
    })
}

fn arb_facts() -> impl Strategy<Value = Json> {
    (any::<i64>(), any::<bool>(), prop_oneof![Just("CASH_OUT"), Just("CASH_IN"), Just("DEBIT")]).prop_map(
        |(amount, flagged, transaction_type)| {
            json!({
                "amount": amount,
                "flagged": flagged,
                "transaction_type": transaction_type,
                "account": { "risk_score": amount % 100 },
            })
        },
    )
}

proptest! {
    /// Evaluating the same tree against the same facts any number of times
    /// produces the same verdict (spec §8 invariant 1).
    #[test]
    fn evaluation_is_deterministic(tree in arb_tree(), facts in arb_facts()) {
        let first = evaluate(&tree, &facts);
        for _ in 0..4 {
            prop_assert_eq!(evaluate(&tree, &facts), first);
        }
    }

    /// `not` is a strict complement of its child under repeated evaluation.
    #[test]
    fn not_negates_its_child(tree in arb_tree(), facts in arb_facts()) {
        let negated = ConditionNode::Not { not: Box::new(tree.clone()) };
        prop_assert_eq!(evaluate(&negated, &facts), !evaluate(&tree, &facts));
    }

    /// An empty `all` is vacuously true, an empty `any` is vacuously false,
    /// regardless of the fact bundle supplied.
    #[test]
    fn empty_combinators_have_fixed_polarity(facts in arb_facts()) {
        prop_assert!(evaluate(&ConditionNode::All { all: vec![] }, &facts));
        prop_assert!(!evaluate(&ConditionNode::Any { any: vec![] }, &facts));
    }
}
