//! Model types for dynaquery.
//!
//! This crate holds the two value types the compiler works on: the
//! store-native [`AttributeValue`] literal, and the Mongo-style
//! [`FilterQuery`] tree a REST layer hands over after parsing a request's
//! `where` clause.
// "DynamoDB" appears in many doc comments in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod query;

pub use attribute_value::AttributeValue;
pub use query::{FilterQuery, FilterValue, LOGICAL_OPERATOR_SYMBOLS, is_logical_symbol};
