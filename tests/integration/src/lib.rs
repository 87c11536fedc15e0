//! End-to-end tests for the dynaquery filter compiler.
//!
//! Each test starts from query text as a REST layer would receive it, compiles
//! it, and checks both the condition tree and the rendered expression.

use std::sync::Once;

use dynaquery_core::{Condition, FilterResult, RenderedExpression};
use dynaquery_model::FilterQuery;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Parse query text.
///
/// # Errors
///
/// Fails if the text is not a JSON object.
pub fn parse_query(text: &str) -> anyhow::Result<FilterQuery> {
    init_tracing();
    Ok(dynaquery_core::parse_filter_query(text)?)
}

/// Parse and compile query text with the attribute dialect.
///
/// # Errors
///
/// Fails if parsing fails; compile errors are returned in the inner result.
pub fn compile_filter(text: &str) -> anyhow::Result<FilterResult<Condition>> {
    let query = parse_query(text)?;
    Ok(dynaquery_core::compile_attribute_filter(&query))
}

/// Parse and compile query text with the key dialect.
///
/// # Errors
///
/// Fails if parsing fails; compile errors are returned in the inner result.
pub fn compile_key(text: &str) -> anyhow::Result<FilterResult<Condition>> {
    let query = parse_query(text)?;
    Ok(dynaquery_core::compile_key_condition(&query))
}

/// Parse, compile with the attribute dialect and render.
///
/// # Errors
///
/// Fails on any parse or compile error.
pub fn render_filter(text: &str) -> anyhow::Result<RenderedExpression> {
    let condition = compile_filter(text)??;
    Ok(dynaquery_core::render(&condition))
}

mod test_attribute_filter;
mod test_error;
mod test_key_condition;
