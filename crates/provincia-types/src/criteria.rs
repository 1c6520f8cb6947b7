//! Criteria trees attached to building templates.
//!
//! A criteria node in the collaborator's tables is a JSON object with exactly
//! one operator key, e.g. `{"AND": ["Forest", {"NOT": ["Swamp"]}]}`. This
//! module parses such nodes once into closed enums so the evaluator can match
//! them exhaustively.
//!
//! Parsing never fails. A node that is not an object, has zero or several
//! keys, names an unknown operator or carries operands of the wrong shape
//! becomes a `Malformed` variant holding the reason and the raw JSON. A
//! malformed node evaluates to `false` and is reported as a criteria defect;
//! serializing it writes the raw JSON back untouched.
//!
//! Operator keys are matched case-insensitively. An empty object `{}` is
//! `Unconstrained` and always holds.
//!
//! Three families exist:
//! - [`TagCriteria`] -- boolean algebra over a set of tags
//! - [`NumericCriteria`] -- comparisons against a single optional number
//! - [`CountCriteria`] -- conditions over building tallies

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Describes a criteria node that could not be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    /// Human-readable reason, e.g. `unknown operator "MAYBE"`.
    pub reason: String,
    /// The node exactly as it was received.
    pub raw: Value,
}

impl Malformed {
    fn new(reason: impl Into<String>, raw: &Value) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.clone(),
        }
    }
}

/// Splits an operator object into its single normalized key and operand.
///
/// `Ok(None)` is the empty object.
fn single_operator(value: &Value) -> Result<Option<(String, &Value)>, Malformed> {
    let Value::Object(map) = value else {
        return Err(Malformed::new("criteria node is not an object", value));
    };
    let mut entries = map.iter();
    let Some((key, operand)) = entries.next() else {
        return Ok(None);
    };
    if entries.next().is_some() {
        return Err(Malformed::new(
            format!("criteria node has {} operator keys, expected one", map.len()),
            value,
        ));
    }
    Ok(Some((key.trim().to_uppercase(), operand)))
}

fn operator_object(key: &str, operand: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_owned(), operand);
    Value::Object(map)
}

/// Reads a JSON number, or a numeric string, as a [`Decimal`].
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Some(Decimal::from(int))
            } else if let Some(uint) = number.as_u64() {
                Some(Decimal::from(uint))
            } else {
                number.as_f64().and_then(|float| Decimal::try_from(float).ok())
            }
        }
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    }
}

fn decimal_to_value(value: Decimal) -> Value {
    if value.fract().is_zero()
        && let Ok(int) = i64::try_from(value)
    {
        return Value::from(int);
    }
    // Non-integral operands round-trip through their string form.
    Value::String(value.normalize().to_string())
}

// ---------------------------------------------------------------------------
// Tag criteria
// ---------------------------------------------------------------------------

/// Boolean algebra over a set of tags (landscapes, planets, cultures...).
#[derive(Debug, Clone, PartialEq)]
pub enum TagCriteria {
    /// `{}`: no constraint.
    Unconstrained,
    /// A leaf operand: membership of this tag in the set.
    Tag(String),
    /// Every operand holds.
    And(Vec<TagCriteria>),
    /// At least one operand holds.
    Or(Vec<TagCriteria>),
    /// The single operand does not hold.
    Not(Box<TagCriteria>),
    /// Exactly one operand holds.
    Xor(Vec<TagCriteria>),
    /// Not every operand holds.
    Nand(Vec<TagCriteria>),
    /// No operand holds.
    Nor(Vec<TagCriteria>),
    /// Could not be interpreted; always false.
    Malformed(Malformed),
}

impl TagCriteria {
    /// Parse a top-level criteria node. Only objects are valid at the top.
    pub fn from_value(value: &Value) -> Self {
        let (key, operand) = match single_operator(value) {
            Ok(Some(pair)) => pair,
            Ok(None) => return Self::Unconstrained,
            Err(malformed) => return Self::Malformed(malformed),
        };
        let list = |build: fn(Vec<Self>) -> Self| match operand {
            Value::Array(items) => build(items.iter().map(Self::operand).collect()),
            _ => Self::Malformed(Malformed::new(
                format!("operator {key} expects a list"),
                value,
            )),
        };
        match key.as_str() {
            "AND" => list(Self::And),
            "OR" => list(Self::Or),
            "XOR" => list(Self::Xor),
            "NAND" => list(Self::Nand),
            "NOR" => list(Self::Nor),
            "NOT" => match operand.as_array().map(Vec::as_slice) {
                Some([only]) => Self::Not(Box::new(Self::operand(only))),
                _ => Self::Malformed(Malformed::new(
                    "NOT expects a list with exactly one operand",
                    value,
                )),
            },
            other => Self::Malformed(Malformed::new(format!("unknown operator \"{other}\""), value)),
        }
    }

    /// Parse a node in operand position, where a bare string is a tag.
    fn operand(value: &Value) -> Self {
        match value {
            Value::String(tag) => Self::Tag(tag.trim().to_owned()),
            _ => Self::from_value(value),
        }
    }

    /// Render back into the collaborator's JSON shape.
    pub fn to_value(&self) -> Value {
        let list = |key: &str, items: &[Self]| {
            operator_object(key, Value::Array(items.iter().map(Self::to_value).collect()))
        };
        match self {
            Self::Unconstrained => Value::Object(Map::new()),
            Self::Tag(tag) => Value::String(tag.clone()),
            Self::And(items) => list("AND", items),
            Self::Or(items) => list("OR", items),
            Self::Not(inner) => operator_object("NOT", Value::Array(vec![inner.to_value()])),
            Self::Xor(items) => list("XOR", items),
            Self::Nand(items) => list("NAND", items),
            Self::Nor(items) => list("NOR", items),
            Self::Malformed(malformed) => malformed.raw.clone(),
        }
    }

    /// Reasons for every malformed node in this tree, outermost first.
    pub fn defects(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_defects(&mut found);
        found
    }

    fn collect_defects(&self, found: &mut Vec<String>) {
        match self {
            Self::Unconstrained | Self::Tag(_) => {}
            Self::And(items)
            | Self::Or(items)
            | Self::Xor(items)
            | Self::Nand(items)
            | Self::Nor(items) => {
                for item in items {
                    item.collect_defects(found);
                }
            }
            Self::Not(inner) => inner.collect_defects(found),
            Self::Malformed(malformed) => found.push(malformed.reason.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric criteria
// ---------------------------------------------------------------------------

/// A comparison against one optional number (radiation, pollution, stability).
#[derive(Debug, Clone, PartialEq)]
pub enum NumericCriteria {
    /// `{}`: no constraint.
    Unconstrained,
    /// `value > bound`.
    GreaterThan(Decimal),
    /// `value < bound`.
    LessThan(Decimal),
    /// `value == bound`.
    EqualTo(Decimal),
    /// `value >= bound`.
    GreaterOrEqualTo(Decimal),
    /// `value <= bound`.
    LessOrEqualTo(Decimal),
    /// `min <= value <= max`.
    Between {
        /// Inclusive lower bound.
        min: Decimal,
        /// Inclusive upper bound.
        max: Decimal,
    },
    /// Could not be interpreted; always false.
    Malformed(Malformed),
}

impl NumericCriteria {
    /// Parse a numeric criteria node.
    pub fn from_value(value: &Value) -> Self {
        let (key, operand) = match single_operator(value) {
            Ok(Some(pair)) => pair,
            Ok(None) => return Self::Unconstrained,
            Err(malformed) => return Self::Malformed(malformed),
        };
        let bound = |build: fn(Decimal) -> Self| match decimal_from_value(operand) {
            Some(number) => build(number),
            None => Self::Malformed(Malformed::new(
                format!("operator {key} expects a number"),
                value,
            )),
        };
        match key.as_str() {
            "GREATER_THAN" => bound(Self::GreaterThan),
            "LESS_THAN" => bound(Self::LessThan),
            "EQUAL_TO" => bound(Self::EqualTo),
            "GREATER_OR_EQUAL_TO" => bound(Self::GreaterOrEqualTo),
            "LESS_OR_EQUAL_TO" => bound(Self::LessOrEqualTo),
            "BETWEEN" => match operand {
                Value::Array(items) if items.len() == 2 => {
                    let min = items.first().and_then(decimal_from_value);
                    let max = items.get(1).and_then(decimal_from_value);
                    match (min, max) {
                        (Some(min), Some(max)) => Self::Between { min, max },
                        _ => Self::Malformed(Malformed::new(
                            "BETWEEN bounds must be numbers",
                            value,
                        )),
                    }
                }
                _ => Self::Malformed(Malformed::new(
                    "BETWEEN expects a [min, max] pair",
                    value,
                )),
            },
            other => Self::Malformed(Malformed::new(format!("unknown operator \"{other}\""), value)),
        }
    }

    /// Render back into the collaborator's JSON shape.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Unconstrained => Value::Object(Map::new()),
            Self::GreaterThan(bound) => operator_object("GREATER_THAN", decimal_to_value(*bound)),
            Self::LessThan(bound) => operator_object("LESS_THAN", decimal_to_value(*bound)),
            Self::EqualTo(bound) => operator_object("EQUAL_TO", decimal_to_value(*bound)),
            Self::GreaterOrEqualTo(bound) => {
                operator_object("GREATER_OR_EQUAL_TO", decimal_to_value(*bound))
            }
            Self::LessOrEqualTo(bound) => {
                operator_object("LESS_OR_EQUAL_TO", decimal_to_value(*bound))
            }
            Self::Between { min, max } => operator_object(
                "BETWEEN",
                Value::Array(vec![decimal_to_value(*min), decimal_to_value(*max)]),
            ),
            Self::Malformed(malformed) => malformed.raw.clone(),
        }
    }

    /// The defect reason, if this node is malformed.
    pub fn defect(&self) -> Option<&str> {
        match self {
            Self::Malformed(malformed) => Some(&malformed.reason),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Count criteria
// ---------------------------------------------------------------------------

/// Conditions over building tallies (building name -> count).
#[derive(Debug, Clone, PartialEq)]
pub enum CountCriteria {
    /// `{}`: no constraint.
    Unconstrained,
    /// Every sub-criterion holds.
    And(Vec<CountCriteria>),
    /// At least one sub-criterion holds.
    Or(Vec<CountCriteria>),
    /// None of the sub-criteria hold.
    Not(Vec<CountCriteria>),
    /// Every listed tally is at least its minimum.
    MinCount(BTreeMap<String, u64>),
    /// Every listed tally is at most its maximum.
    MaxCount(BTreeMap<String, u64>),
    /// Both buildings are present, or both are absent.
    Xnor(String, String),
    /// If the first building is present, so is the second.
    Implies(String, String),
    /// Could not be interpreted; always false.
    Malformed(Malformed),
}

impl CountCriteria {
    /// Parse a count criteria node.
    pub fn from_value(value: &Value) -> Self {
        let (key, operand) = match single_operator(value) {
            Ok(Some(pair)) => pair,
            Ok(None) => return Self::Unconstrained,
            Err(malformed) => return Self::Malformed(malformed),
        };
        let list = |build: fn(Vec<Self>) -> Self| match operand {
            Value::Array(items) => build(items.iter().map(Self::from_value).collect()),
            _ => Self::Malformed(Malformed::new(
                format!("operator {key} expects a list"),
                value,
            )),
        };
        let bounds = |build: fn(BTreeMap<String, u64>) -> Self| {
            let Value::Object(entries) = operand else {
                return Self::Malformed(Malformed::new(
                    format!("operator {key} expects a name -> count object"),
                    value,
                ));
            };
            let mut parsed = BTreeMap::new();
            for (name, count) in entries {
                let Some(count) = count.as_u64() else {
                    return Self::Malformed(Malformed::new(
                        format!("{key} count for \"{name}\" is not a non-negative integer"),
                        value,
                    ));
                };
                parsed.insert(name.trim().to_owned(), count);
            }
            build(parsed)
        };
        let pair = |build: fn(String, String) -> Self| match operand {
            Value::Array(items) => match items.as_slice() {
                [Value::String(first), Value::String(second)] => {
                    build(first.trim().to_owned(), second.trim().to_owned())
                }
                _ => Self::Malformed(Malformed::new(
                    format!("operator {key} expects two building names"),
                    value,
                )),
            },
            _ => Self::Malformed(Malformed::new(
                format!("operator {key} expects two building names"),
                value,
            )),
        };
        match key.as_str() {
            "AND" => list(Self::And),
            "OR" => list(Self::Or),
            "NOT" => list(Self::Not),
            "MIN_COUNT" => bounds(Self::MinCount),
            "MAX_COUNT" => bounds(Self::MaxCount),
            "XNOR" => pair(Self::Xnor),
            "IMPLIES" => pair(Self::Implies),
            other => Self::Malformed(Malformed::new(format!("unknown operator \"{other}\""), value)),
        }
    }

    /// Render back into the collaborator's JSON shape.
    pub fn to_value(&self) -> Value {
        let list = |key: &str, items: &[Self]| {
            operator_object(key, Value::Array(items.iter().map(Self::to_value).collect()))
        };
        let bounds = |key: &str, entries: &BTreeMap<String, u64>| {
            let map = entries
                .iter()
                .map(|(name, count)| (name.clone(), Value::from(*count)))
                .collect::<Map<String, Value>>();
            operator_object(key, Value::Object(map))
        };
        let pair = |key: &str, first: &str, second: &str| {
            operator_object(key, Value::Array(vec![Value::from(first), Value::from(second)]))
        };
        match self {
            Self::Unconstrained => Value::Object(Map::new()),
            Self::And(items) => list("AND", items),
            Self::Or(items) => list("OR", items),
            Self::Not(items) => list("NOT", items),
            Self::MinCount(entries) => bounds("MIN_COUNT", entries),
            Self::MaxCount(entries) => bounds("MAX_COUNT", entries),
            Self::Xnor(first, second) => pair("XNOR", first, second),
            Self::Implies(first, second) => pair("IMPLIES", first, second),
            Self::Malformed(malformed) => malformed.raw.clone(),
        }
    }

    /// Reasons for every malformed node in this tree, outermost first.
    pub fn defects(&self) -> Vec<String> {
        let mut found = Vec::new();
        self.collect_defects(&mut found);
        found
    }

    fn collect_defects(&self, found: &mut Vec<String>) {
        match self {
            Self::And(items) | Self::Or(items) | Self::Not(items) => {
                for item in items {
                    item.collect_defects(found);
                }
            }
            Self::Malformed(malformed) => found.push(malformed.reason.clone()),
            Self::Unconstrained
            | Self::MinCount(_)
            | Self::MaxCount(_)
            | Self::Xnor(..)
            | Self::Implies(..) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

macro_rules! impl_value_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.to_value().serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                Ok(Self::from_value(&value))
            }
        }
    };
}

impl_value_serde!(TagCriteria);
impl_value_serde!(NumericCriteria);
impl_value_serde!(CountCriteria);
