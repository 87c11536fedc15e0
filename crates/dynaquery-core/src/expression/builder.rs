//! Recursive-descent compiler from [`FilterQuery`] to [`Condition`].
//!
//! Each clause of a query compiles to one operand and the operands are
//! conjoined left to right. A clause is handled by the first rule that fits:
//!
//! 1. A nested query recurses, and the clause key becomes the field name for
//!    every leaf inside it. Deeper nesting replaces it, so the innermost
//!    enclosing key wins.
//! 2. A logical list under `$and`/`$or`/`$not`/`$nor`/`$xor` is folded, if the
//!    dialect honours combinators. Sub-queries start with no field name.
//! 3. Anything else is a leaf. The key is looked up in the dialect's registry
//!    (unknown keys mean equality) and applied to the field in scope, or to
//!    the key itself at the top level.

use dynaquery_model::{FilterQuery, FilterValue};
use tracing::{debug, trace};

use super::ast::{Condition, LogicalOp};
use super::operator::{LogicalOperator, OperatorRegistry};
use crate::config::CompilerConfig;
use crate::error::{FilterError, FilterResult};

/// Compile a query with the full attribute dialect.
///
/// # Errors
///
/// Returns [`FilterError`] if the query or any nested query is empty, a
/// combinator has the wrong arity, an operand is malformed, or nesting
/// exceeds the depth limit (`DYNAQUERY_MAX_DEPTH`, 32 unless set).
pub fn compile_attribute_filter(query: &FilterQuery) -> FilterResult<Condition> {
    ExpressionBuilder::attribute().build(query)
}

/// Compile a query with the key dialect.
///
/// Only range operators are recognized and logical combinators are treated
/// as plain field names, so the result is always a conjunction.
///
/// # Errors
///
/// Same failure modes as [`compile_attribute_filter`], minus arity errors.
pub fn compile_key_condition(query: &FilterQuery) -> FilterResult<Condition> {
    ExpressionBuilder::key().build(query)
}

/// Decode query text into a [`FilterQuery`].
///
/// # Errors
///
/// Returns [`FilterError::Deserialize`] if the text is not a JSON object.
pub fn parse_filter_query(text: &str) -> FilterResult<FilterQuery> {
    Ok(FilterQuery::from_json_str(text)?)
}

/// Filter compiler for one dialect.
#[derive(Debug, Clone)]
pub struct ExpressionBuilder {
    registry: OperatorRegistry,
    config: CompilerConfig,
}

impl ExpressionBuilder {
    /// Create a builder for `registry`.
    #[must_use]
    pub fn new(registry: OperatorRegistry, config: CompilerConfig) -> Self {
        Self { registry, config }
    }

    /// Builder for the attribute dialect, configured from the environment.
    #[must_use]
    pub fn attribute() -> Self {
        Self::new(OperatorRegistry::ATTRIBUTE, CompilerConfig::from_env())
    }

    /// Builder for the key dialect, configured from the environment.
    #[must_use]
    pub fn key() -> Self {
        Self::new(OperatorRegistry::KEY, CompilerConfig::from_env())
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile `query` into a single condition.
    ///
    /// # Errors
    ///
    /// See [`compile_attribute_filter`].
    pub fn build(&self, query: &FilterQuery) -> FilterResult<Condition> {
        debug!(
            dialect = self.registry.name(),
            clauses = query.len(),
            "compiling filter query"
        );

        let condition = self.build_query(query, None, 1)?;

        if self.registry.logical_combinators() {
            debug!(dialect = self.registry.name(), %condition, "compiled filter query");
        } else {
            debug!(
                dialect = self.registry.name(),
                keys = ?condition.attribute_names(),
                %condition,
                "compiled key condition"
            );
        }
        Ok(condition)
    }

    fn build_query(
        &self,
        query: &FilterQuery,
        field: Option<&str>,
        depth: usize,
    ) -> FilterResult<Condition> {
        if depth > self.config.max_depth {
            return Err(FilterError::RecursionDepthExceeded {
                limit: self.config.max_depth,
            });
        }

        let operands = query
            .iter()
            .map(|(key, value)| self.build_clause(key, value, field, depth))
            .collect::<FilterResult<Vec<_>>>()?;

        fold(operands, LogicalOp::And)
    }

    fn build_clause(
        &self,
        key: &str,
        value: &FilterValue,
        field: Option<&str>,
        depth: usize,
    ) -> FilterResult<Condition> {
        trace!(key, ?field, depth, "compiling clause");

        match value {
            FilterValue::Query(nested) => self.build_query(nested, Some(key), depth + 1),
            FilterValue::Logical(queries) if self.registry.logical_combinators() => {
                match LogicalOperator::from_symbol(key) {
                    Some(op) => self.build_logical(op, queries, depth + 1),
                    None => self.build_leaf(key, value, field),
                }
            }
            FilterValue::Scalar(_) | FilterValue::Logical(_) => {
                self.build_leaf(key, value, field)
            }
        }
    }

    fn build_logical(
        &self,
        op: LogicalOperator,
        queries: &[FilterQuery],
        depth: usize,
    ) -> FilterResult<Condition> {
        match op {
            LogicalOperator::And => fold(self.build_each(queries, depth)?, LogicalOp::And),
            LogicalOperator::Or => fold(self.build_each(queries, depth)?, LogicalOp::Or),
            LogicalOperator::Not => {
                fold(self.build_each(queries, depth)?, LogicalOp::And).map(Condition::negate)
            }
            LogicalOperator::Nor => {
                fold(self.build_each(queries, depth)?, LogicalOp::Or).map(Condition::negate)
            }
            LogicalOperator::Xor => {
                let [first, second] = queries else {
                    return Err(FilterError::InvalidOperatorArity {
                        operator: op.symbol(),
                        expected: 2,
                        found: queries.len(),
                    });
                };
                let a = self.build_query(first, None, depth)?;
                let b = self.build_query(second, None, depth)?;
                Ok(a.clone().and(b.clone().negate()).or(a.negate().and(b)))
            }
        }
    }

    fn build_each(&self, queries: &[FilterQuery], depth: usize) -> FilterResult<Vec<Condition>> {
        queries
            .iter()
            .map(|query| self.build_query(query, None, depth))
            .collect()
    }

    fn build_leaf(
        &self,
        key: &str,
        value: &FilterValue,
        field: Option<&str>,
    ) -> FilterResult<Condition> {
        let operator = self.registry.lookup(key);
        if (field.is_some() || key.starts_with('$')) && !self.registry.recognizes(key) {
            debug!(
                dialect = self.registry.name(),
                symbol = key,
                "unrecognized operator symbol, comparing for equality"
            );
        }

        operator.construct(field.unwrap_or(key), value.to_attribute_value())
    }
}

fn fold(operands: Vec<Condition>, op: LogicalOp) -> FilterResult<Condition> {
    let mut iter = operands.into_iter();
    let first = iter.next().ok_or(FilterError::EmptyQuery)?;
    Ok(iter.fold(first, |acc, next| match op {
        LogicalOp::And => acc.and(next),
        LogicalOp::Or => acc.or(next),
    }))
}
