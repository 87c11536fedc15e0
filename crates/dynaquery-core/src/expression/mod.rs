//! Filter query compilation.
//!
//! The pipeline is:
//!
//! 1. **Lookup**: resolve each operator symbol against a dialect's
//!    [`OperatorRegistry`], defaulting to equality.
//! 2. **Building**: fold the query into a [`Condition`] tree by recursive
//!    descent, threading the enclosing field name downwards.
//! 3. **Rendering**: turn the tree into DynamoDB expression text with name
//!    and value placeholders.

pub mod ast;
pub mod builder;
pub mod operator;
pub mod render;

pub use ast::{AttributePath, CompareOp, Condition, FunctionName, LogicalOp, Operand, PathElement};
pub use builder::{
    ExpressionBuilder, compile_attribute_filter, compile_key_condition, parse_filter_query,
};
pub use operator::{LogicalOperator, Operator, OperatorRegistry};
pub use render::{RenderedExpression, render};
