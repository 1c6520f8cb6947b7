//! Criteria evaluation.
//!
//! Each criteria family is evaluated against its own context:
//!
//! | Family              | Context                                   |
//! |---------------------|-------------------------------------------|
//! | [`TagCriteria`]     | a set of case-folded tags ([`TagSet`])    |
//! | [`NumericCriteria`] | one optional number                       |
//! | [`CountCriteria`]   | building name -> count ([`Tally`])        |
//!
//! Evaluation is pure and total: it never fails and never mutates the
//! node. Malformed nodes evaluate to `false`; reporting them is the
//! caller's job.

use std::collections::BTreeSet;

use provincia_types::{CountCriteria, NumericCriteria, TagCriteria, normalize_tag, normalize_tags};
use rust_decimal::Decimal;

use crate::tallies::{Tally, count_of};

/// A set of tags, already trimmed and case-folded.
pub type TagSet = BTreeSet<String>;

/// Build a [`TagSet`] from raw tags.
pub fn tag_set(tags: &BTreeSet<String>) -> TagSet {
    normalize_tags(tags)
}

/// A criteria node evaluable against a context.
pub trait Evaluate {
    /// What the node is evaluated against.
    type Context: ?Sized;

    /// Whether the node holds in `context`.
    fn evaluate(&self, context: &Self::Context) -> bool;
}

impl Evaluate for TagCriteria {
    type Context = TagSet;

    fn evaluate(&self, tags: &TagSet) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::Tag(tag) => tags.contains(&normalize_tag(tag)),
            Self::And(items) => items.iter().all(|item| item.evaluate(tags)),
            Self::Or(items) => items.iter().any(|item| item.evaluate(tags)),
            Self::Not(inner) => !inner.evaluate(tags),
            Self::Xor(items) => items.iter().filter(|item| item.evaluate(tags)).take(2).count() == 1,
            Self::Nand(items) => !items.iter().all(|item| item.evaluate(tags)),
            Self::Nor(items) => !items.iter().any(|item| item.evaluate(tags)),
            Self::Malformed(_) => false,
        }
    }
}

impl Evaluate for NumericCriteria {
    type Context = Option<Decimal>;

    fn evaluate(&self, value: &Option<Decimal>) -> bool {
        match (self, *value) {
            (Self::Unconstrained, _) => true,
            (Self::Malformed(_), _) | (_, None) => false,
            (Self::GreaterThan(bound), Some(value)) => value > *bound,
            (Self::LessThan(bound), Some(value)) => value < *bound,
            (Self::EqualTo(bound), Some(value)) => value == *bound,
            (Self::GreaterOrEqualTo(bound), Some(value)) => value >= *bound,
            (Self::LessOrEqualTo(bound), Some(value)) => value <= *bound,
            (Self::Between { min, max }, Some(value)) => *min <= value && value <= *max,
        }
    }
}

impl Evaluate for CountCriteria {
    type Context = Tally;

    fn evaluate(&self, tally: &Tally) -> bool {
        let count = |name: &str| count_of(tally, name);
        match self {
            Self::Unconstrained => true,
            Self::And(items) => items.iter().all(|item| item.evaluate(tally)),
            Self::Or(items) => items.iter().any(|item| item.evaluate(tally)),
            Self::Not(items) => !items.iter().any(|item| item.evaluate(tally)),
            Self::MinCount(bounds) => bounds.iter().all(|(name, min)| count(name) >= *min),
            Self::MaxCount(bounds) => bounds.iter().all(|(name, max)| count(name) <= *max),
            Self::Xnor(first, second) => (count(first) > 0) == (count(second) > 0),
            Self::Implies(first, second) => count(first) == 0 || count(second) > 0,
            Self::Malformed(_) => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn tags(items: &[&str]) -> TagSet {
        let raw: BTreeSet<String> = items.iter().map(|tag| (*tag).to_owned()).collect();
        tag_set(&raw)
    }

    fn tally(items: &[(&str, u64)]) -> Tally {
        items
            .iter()
            .map(|(name, count)| ((*name).to_owned(), *count))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Tags
    // -----------------------------------------------------------------------

    #[test]
    fn tag_leaves_ignore_case_and_whitespace() {
        let node = TagCriteria::from_value(&json!({"and": [" forest ", "HILLS"]}));
        assert!(node.evaluate(&tags(&["Forest", "Hills"])));
        assert!(!node.evaluate(&tags(&["Forest"])));
    }

    #[test]
    fn nested_tag_operators() {
        let node = TagCriteria::from_value(&json!({
            "OR": [{"AND": ["Forest", {"NOT": ["Swamp"]}]}, "Coast"]
        }));
        assert!(node.evaluate(&tags(&["Forest"])));
        assert!(!node.evaluate(&tags(&["Forest", "Swamp"])));
        assert!(node.evaluate(&tags(&["Forest", "Swamp", "Coast"])));
    }

    #[test]
    fn xor_needs_exactly_one() {
        let node = TagCriteria::from_value(&json!({"XOR": ["A", "B", "C"]}));
        assert!(node.evaluate(&tags(&["B"])));
        assert!(!node.evaluate(&tags(&["A", "C"])));
        assert!(!node.evaluate(&tags(&[])));
    }

    #[test]
    fn nand_and_nor() {
        let nand = TagCriteria::from_value(&json!({"NAND": ["A", "B"]}));
        let nor = TagCriteria::from_value(&json!({"NOR": ["A", "B"]}));
        assert!(nand.evaluate(&tags(&["A"])));
        assert!(!nand.evaluate(&tags(&["A", "B"])));
        assert!(nor.evaluate(&tags(&["C"])));
        assert!(!nor.evaluate(&tags(&["B"])));
    }

    #[test]
    fn malformed_tag_nodes_are_false() {
        for raw in [
            json!({"AND": ["A"], "OR": ["A"]}),
            json!({"MAYBE": ["A"]}),
            json!({"NOT": ["A", "B"]}),
            json!(["A"]),
        ] {
            let node = TagCriteria::from_value(&raw);
            assert!(!node.evaluate(&tags(&["A", "B"])), "{raw}");
            assert!(!node.defects().is_empty());
        }
    }

    #[test]
    fn empty_object_is_unconstrained() {
        let node = TagCriteria::from_value(&json!({}));
        assert!(node.evaluate(&tags(&[])));
        assert!(CountCriteria::from_value(&json!({})).evaluate(&Tally::new()));
        assert!(NumericCriteria::from_value(&json!({})).evaluate(&None));
    }

    // -----------------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------------

    #[test]
    fn numeric_comparisons() {
        let between = NumericCriteria::from_value(&json!({"BETWEEN": [10, 20]}));
        assert!(between.evaluate(&Some(dec!(10))));
        assert!(between.evaluate(&Some(dec!(20))));
        assert!(!between.evaluate(&Some(dec!(20.5))));

        let below = NumericCriteria::from_value(&json!({"less_than": 5}));
        assert!(below.evaluate(&Some(dec!(4.9))));
        assert!(!below.evaluate(&Some(dec!(5))));

        let exact = NumericCriteria::from_value(&json!({"EQUAL_TO": "3.5"}));
        assert!(exact.evaluate(&Some(dec!(3.50))));
    }

    #[test]
    fn missing_scalar_fails_every_operator() {
        for raw in [
            json!({"GREATER_THAN": 0}),
            json!({"LESS_THAN": 100}),
            json!({"GREATER_OR_EQUAL_TO": 0}),
            json!({"LESS_OR_EQUAL_TO": 0}),
            json!({"BETWEEN": [0, 1]}),
        ] {
            assert!(!NumericCriteria::from_value(&raw).evaluate(&None), "{raw}");
        }
    }

    // -----------------------------------------------------------------------
    // Counts
    // -----------------------------------------------------------------------

    #[test]
    fn min_count_boundary() {
        let node = CountCriteria::from_value(&json!({"MIN_COUNT": {"Barracks": 3}}));
        assert!(node.evaluate(&tally(&[("Barracks", 3)])));
        assert!(!node.evaluate(&tally(&[("Barracks", 2)])));
        assert!(!node.evaluate(&Tally::new()));
    }

    #[test]
    fn max_count_treats_missing_as_zero() {
        let node = CountCriteria::from_value(&json!({"MAX_COUNT": {"Temple": 0}}));
        assert!(node.evaluate(&Tally::new()));
        assert!(!node.evaluate(&tally(&[("Temple", 1)])));
    }

    #[test]
    fn xnor_and_implies() {
        let xnor = CountCriteria::from_value(&json!({"XNOR": ["Mine", "Smelter"]}));
        assert!(xnor.evaluate(&Tally::new()));
        assert!(xnor.evaluate(&tally(&[("Mine", 2), ("Smelter", 1)])));
        assert!(!xnor.evaluate(&tally(&[("Mine", 2)])));

        let implies = CountCriteria::from_value(&json!({"IMPLIES": ["Mine", "Smelter"]}));
        assert!(implies.evaluate(&Tally::new()));
        assert!(implies.evaluate(&tally(&[("Smelter", 1)])));
        assert!(!implies.evaluate(&tally(&[("Mine", 1)])));
    }

    #[test]
    fn count_not_means_none_hold() {
        let node = CountCriteria::from_value(&json!({"NOT": [
            {"MIN_COUNT": {"Mine": 1}},
            {"MIN_COUNT": {"Farm": 1}}
        ]}));
        assert!(node.evaluate(&Tally::new()));
        assert!(!node.evaluate(&tally(&[("Farm", 1)])));
    }

    #[test]
    fn count_names_are_exact() {
        let node = CountCriteria::from_value(&json!({"MIN_COUNT": {"Mine": 1}}));
        assert!(!node.evaluate(&tally(&[("mine", 1)])));
    }
}
