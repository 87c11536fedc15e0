//! Mongo-style filter queries.
//!
//! A [`FilterQuery`] is an ordered list of `(key, value)` clauses. A key is
//! either a field name or one of the logical-operator symbols in
//! [`LOGICAL_OPERATOR_SYMBOLS`]. The value shape decides how the compiler
//! treats the clause:
//!
//! - [`FilterValue::Scalar`]: an equality target (or an operator argument when
//!   the clause sits inside an operator map).
//! - [`FilterValue::Query`]: a nested map whose clauses apply to the
//!   enclosing key.
//! - [`FilterValue::Logical`]: a list of sub-queries under a logical operator.
//!
//! Queries are parsed from plain JSON, e.g.
//! `{"age": {"$gte": 21}, "$or": [{"name": "a"}, {"name": "b"}]}`.

use std::collections::HashMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::AttributeValue;

/// Keys recognized as logical operators when their value is a list of queries.
pub const LOGICAL_OPERATOR_SYMBOLS: [&str; 5] = ["$not", "$and", "$or", "$nor", "$xor"];

/// Returns `true` if `key` is one of the logical-operator symbols.
#[must_use]
pub fn is_logical_symbol(key: &str) -> bool {
    LOGICAL_OPERATOR_SYMBOLS.contains(&key)
}

/// The value half of a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A literal value.
    Scalar(AttributeValue),
    /// A nested map of clauses scoped to the enclosing key.
    Query(FilterQuery),
    /// A list of sub-queries. Only produced under a logical-operator key.
    Logical(Vec<FilterQuery>),
}

impl FilterValue {
    /// Flatten this value into a single literal.
    ///
    /// Nested queries become maps and logical lists become lists of maps.
    /// Used when a clause that looks structured has to be compared as a
    /// plain value.
    #[must_use]
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Query(q) => q.to_attribute_value(),
            Self::Logical(list) => {
                AttributeValue::L(list.iter().map(FilterQuery::to_attribute_value).collect())
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Scalar(v) => v.to_json(),
            Self::Query(q) => q.to_json(),
            Self::Logical(list) => Value::Array(list.iter().map(FilterQuery::to_json).collect()),
        }
    }

    fn from_json(key: &str, value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Query(FilterQuery::from_object(map)),
            Value::Array(items) if is_logical_symbol(key) && items.iter().all(Value::is_object) => {
                Self::Logical(
                    items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(map) => Some(FilterQuery::from_object(map)),
                            _ => None,
                        })
                        .collect(),
                )
            }
            other => Self::Scalar(AttributeValue::from(other)),
        }
    }
}

impl From<AttributeValue> for FilterValue {
    fn from(value: AttributeValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<FilterQuery> for FilterValue {
    fn from(query: FilterQuery) -> Self {
        Self::Query(query)
    }
}

/// An ordered collection of filter clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    clauses: Vec<(String, FilterValue)>,
}

impl FilterQuery {
    /// Create an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a clause.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FilterValue>) {
        self.clauses.push((key.into(), value.into()));
    }

    /// Number of top-level clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns `true` if the query has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterate over the top-level clauses in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.clauses.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Intersect two queries as `{"$and": [a, b]}`.
    #[must_use]
    pub fn combine(a: Self, b: Self) -> Self {
        Self::new().with("$and", FilterValue::Logical(vec![a, b]))
    }

    /// Returns `true` if `field` appears as a key anywhere in the query tree.
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.value_for_field(field).is_some()
    }

    /// Find the value bound to `field`, searching nested queries and logical
    /// lists depth-first. The first match in clause order wins.
    #[must_use]
    pub fn value_for_field(&self, field: &str) -> Option<&FilterValue> {
        for (key, value) in &self.clauses {
            if key == field {
                return Some(value);
            }
            let nested = match value {
                FilterValue::Scalar(_) => None,
                FilterValue::Query(q) => q.value_for_field(field),
                FilterValue::Logical(list) => list.iter().find_map(|q| q.value_for_field(field)),
            };
            if nested.is_some() {
                return nested;
            }
        }
        None
    }

    /// Parse a query from JSON text, keeping clause order.
    ///
    /// # Errors
    ///
    /// Fails if the text is not valid JSON or the top level is not an object.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Convert the query into a map literal.
    #[must_use]
    pub fn to_attribute_value(&self) -> AttributeValue {
        AttributeValue::M(
            self.clauses
                .iter()
                .map(|(k, v)| (k.clone(), v.to_attribute_value()))
                .collect::<HashMap<_, _>>(),
        )
    }

    /// Convert the query back to untyped JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.clauses
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    fn from_object(map: Map<String, Value>) -> Self {
        map.into_iter()
            .map(|(key, value)| {
                let value = FilterValue::from_json(&key, value);
                (key, value)
            })
            .collect()
    }
}

impl FromIterator<(String, FilterValue)> for FilterQuery {
    fn from_iter<I: IntoIterator<Item = (String, FilterValue)>>(iter: I) -> Self {
        Self {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FilterQuery {
    type Item = &'a (String, FilterValue);
    type IntoIter = std::slice::Iter<'a, (String, FilterValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

impl TryFrom<Value> for FilterQuery {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}

impl fmt::Display for FilterQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Serialize for FilterQuery {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.clauses.len()))?;
        for (key, value) in &self.clauses {
            map.serialize_entry(key, &value.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FilterQuery {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_object(map))
    }
}
