//! Filter query compiler for dynaquery.
//!
//! Translates nested, Mongo-style filter queries into a boolean [`Condition`]
//! tree that maps one-to-one onto DynamoDB filter and key-condition syntax.
//! Two dialects exist:
//!
//! - [`compile_attribute_filter`] accepts the full operator set and the
//!   logical combinators `$and`, `$or`, `$not`, `$nor` and `$xor`.
//! - [`compile_key_condition`] accepts only the range operators DynamoDB
//!   allows on partition and sort keys, and always conjoins.
//!
//! Compiled conditions can be turned into expression text with
//! [`render`].
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod expression;

pub use config::CompilerConfig;
pub use error::{FilterError, FilterResult};
pub use expression::{
    Condition, ExpressionBuilder, Operator, OperatorRegistry, RenderedExpression,
    compile_attribute_filter, compile_key_condition, parse_filter_query, render,
};
