//! Operator registries for the attribute and key dialects.
//!
//! Every comparison tag a query may use is a variant of [`Operator`]. A
//! dialect is an [`OperatorRegistry`]: the subset of operators it recognizes
//! and whether it accepts logical combinators. Lookups never fail. A symbol the
//! registry does not know resolves to [`Operator::Eq`], so
//! `{"field": {"ne": 1}}` compiles to `field = 1`.

use std::fmt;

use dynaquery_model::AttributeValue;

use super::ast::Condition;
use crate::error::{FilterError, FilterResult};

/// A comparison operator tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `$eq`: equality.
    Eq,
    /// `$ne`: inequality.
    Ne,
    /// `$lt`: less than.
    Lt,
    /// `$lte`: less than or equal.
    Lte,
    /// `$gt`: greater than.
    Gt,
    /// `$gte`: greater than or equal.
    Gte,
    /// `$in`: membership in a list.
    In,
    /// `$nin`: negated membership.
    Nin,
    /// `$between`: inclusive `[low, high]` range.
    Between,
    /// `$contains`: substring or element containment.
    Contains,
    /// `$exists`: presence (`true`) or absence (`false`).
    Exists,
    /// `$size`: collection cardinality equals the value.
    Size,
    /// `$startsWith`: prefix match.
    StartsWith,
    /// `$type`: store-native type tag match.
    Type,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::In,
        Self::Nin,
        Self::Between,
        Self::Contains,
        Self::Exists,
        Self::Size,
        Self::StartsWith,
        Self::Type,
    ];

    /// The query-language symbol for this operator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::In => "$in",
            Self::Nin => "$nin",
            Self::Between => "$between",
            Self::Contains => "$contains",
            Self::Exists => "$exists",
            Self::Size => "$size",
            Self::StartsWith => "$startsWith",
            Self::Type => "$type",
        }
    }

    /// Parse an operator symbol. Matching is exact and case-sensitive.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Build the condition for `field <op> value`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MalformedOperand`] when `value` has the wrong
    /// shape for the operator.
    pub fn construct(self, field: &str, value: AttributeValue) -> FilterResult<Condition> {
        let condition = match self {
            Self::Eq => Condition::eq(field, value),
            Self::Ne => Condition::ne(field, value),
            Self::Lt => Condition::lt(field, value),
            Self::Lte => Condition::lte(field, value),
            Self::Gt => Condition::gt(field, value),
            Self::Gte => Condition::gte(field, value),
            Self::In => Condition::is_in(field, self.expect_list(value)?),
            Self::Nin => Condition::is_in(field, self.expect_list(value)?).negate(),
            Self::Between => {
                let [low, high] = self.expect_pair(value)?;
                Condition::between(field, low, high)
            }
            Self::Contains => Condition::contains(field, value),
            Self::Exists => match value {
                AttributeValue::Bool(true) => Condition::exists(field),
                AttributeValue::Bool(false) => Condition::not_exists(field),
                other => return Err(self.unexpected("a boolean", &other)),
            },
            Self::Size => match value {
                AttributeValue::N(_) => Condition::size_eq(field, value),
                other => return Err(self.unexpected("a number", &other)),
            },
            Self::StartsWith => match value {
                AttributeValue::S(_) | AttributeValue::B(_) => {
                    Condition::begins_with(field, value)
                }
                other => return Err(self.unexpected("a string or binary prefix", &other)),
            },
            Self::Type => match value {
                AttributeValue::S(_) => Condition::attribute_type(field, value),
                other => return Err(self.unexpected("a type tag string", &other)),
            },
        };
        Ok(condition)
    }

    fn expect_list(self, value: AttributeValue) -> FilterResult<Vec<AttributeValue>> {
        match value {
            AttributeValue::L(items) if !items.is_empty() => Ok(items),
            AttributeValue::L(_) => Err(FilterError::malformed(
                self.symbol(),
                "expected a non-empty list",
            )),
            other => Err(self.unexpected("a list", &other)),
        }
    }

    fn expect_pair(self, value: AttributeValue) -> FilterResult<[AttributeValue; 2]> {
        match value {
            AttributeValue::L(items) => {
                let found = items.len();
                <[AttributeValue; 2]>::try_from(items).map_err(|_| {
                    FilterError::malformed(
                        self.symbol(),
                        format!("expected a [low, high] pair, got {found} elements"),
                    )
                })
            }
            other => Err(self.unexpected("a [low, high] pair", &other)),
        }
    }

    fn unexpected(self, expected: &str, found: &AttributeValue) -> FilterError {
        FilterError::malformed(
            self.symbol(),
            format!("expected {expected}, got {} value {found}", found.type_descriptor()),
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical combinators recognized by the attribute dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// `$not`: conjoin the sub-queries, then negate.
    Not,
    /// `$and`: conjoin the sub-queries.
    And,
    /// `$or`: disjoin the sub-queries.
    Or,
    /// `$nor`: disjoin the sub-queries, then negate.
    Nor,
    /// `$xor`: exactly one of two sub-queries holds.
    Xor,
}

impl LogicalOperator {
    /// The query-language symbol for this combinator.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "$not",
            Self::And => "$and",
            Self::Or => "$or",
            Self::Nor => "$nor",
            Self::Xor => "$xor",
        }
    }

    /// Parse a combinator symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "$not" => Some(Self::Not),
            "$and" => Some(Self::And),
            "$or" => Some(Self::Or),
            "$nor" => Some(Self::Nor),
            "$xor" => Some(Self::Xor),
            _ => None,
        }
    }
}

/// A dialect: the operators it recognizes and whether logical combinators
/// are honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorRegistry {
    name: &'static str,
    operators: &'static [Operator],
    logical_combinators: bool,
}

impl OperatorRegistry {
    /// Full operator set for filter and scan conditions.
    pub const ATTRIBUTE: Self = Self {
        name: "attribute",
        operators: &Operator::ALL,
        logical_combinators: true,
    };

    /// Range operators allowed on partition and sort keys. Key conditions
    /// can only conjoin, so logical combinators are not recognized.
    pub const KEY: Self = Self {
        name: "key",
        operators: &[
            Operator::Eq,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
            Operator::Between,
            Operator::StartsWith,
        ],
        logical_combinators: false,
    };

    /// Dialect name, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `$and`/`$or`/`$not`/`$nor`/`$xor` are interpreted.
    #[must_use]
    pub fn logical_combinators(&self) -> bool {
        self.logical_combinators
    }

    /// Returns `true` if `symbol` names an operator in this dialect.
    #[must_use]
    pub fn recognizes(&self, symbol: &str) -> bool {
        Operator::from_symbol(symbol).is_some_and(|op| self.operators.contains(&op))
    }

    /// Resolve `symbol` to an operator, defaulting to [`Operator::Eq`] when
    /// the dialect does not recognize it.
    #[must_use]
    pub fn lookup(&self, symbol: &str) -> Operator {
        Operator::from_symbol(symbol)
            .filter(|op| self.operators.contains(op))
            .unwrap_or(Operator::Eq)
    }
}
