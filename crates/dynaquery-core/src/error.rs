//! Error type for filter compilation.

/// Errors produced while compiling a filter query.
///
/// All of these describe a malformed query. None of them are transient, so
/// callers should surface them rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A logical combinator with a fixed operand count got a different count.
    #[error("{operator} takes exactly {expected} sub-queries, got {found}")]
    InvalidOperatorArity {
        /// The combinator symbol, e.g. `$xor`.
        operator: &'static str,
        /// Required operand count.
        expected: usize,
        /// Operand count supplied.
        found: usize,
    },

    /// A query, nested query or logical list had no clauses.
    #[error("filter query must contain at least one clause")]
    EmptyQuery,

    /// Nesting went deeper than the configured limit.
    #[error("filter query nesting exceeds maximum depth of {limit}")]
    RecursionDepthExceeded {
        /// The configured limit.
        limit: usize,
    },

    /// An operator received a value of the wrong shape.
    #[error("invalid operand for {operator}: {message}")]
    MalformedOperand {
        /// The operator symbol.
        operator: &'static str,
        /// Explanation.
        message: String,
    },

    /// The query text could not be decoded.
    #[error("invalid filter query: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl FilterError {
    pub(crate) fn malformed(operator: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedOperand {
            operator,
            message: message.into(),
        }
    }
}

/// Convenience result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;
