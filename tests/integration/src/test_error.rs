//! Error propagation tests.

#[cfg(test)]
mod tests {
    use dynaquery_core::{CompilerConfig, ExpressionBuilder, FilterError};

    use crate::{compile_filter, compile_key, parse_query};

    #[test]
    fn test_should_reject_xor_arity() -> anyhow::Result<()> {
        let err = compile_filter(r#"{"$xor": [{"a": 1}, {"b": 2}, {"c": 3}]}"#)?.unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidOperatorArity { operator: "$xor", expected: 2, found: 3 }
        ));
        assert_eq!(err.to_string(), "$xor takes exactly 2 sub-queries, got 3");
        Ok(())
    }

    #[test]
    fn test_should_reject_empty_query_in_both_dialects() -> anyhow::Result<()> {
        assert!(matches!(compile_filter("{}")?, Err(FilterError::EmptyQuery)));
        assert!(matches!(compile_key("{}")?, Err(FilterError::EmptyQuery)));
        assert!(matches!(
            compile_key(r#"{"pk": {}}"#)?,
            Err(FilterError::EmptyQuery)
        ));
        Ok(())
    }

    #[test]
    fn test_should_reject_malformed_operands() -> anyhow::Result<()> {
        for text in [
            r#"{"a": {"$between": 5}}"#,
            r#"{"a": {"$in": "x"}}"#,
            r#"{"a": {"$exists": "yes"}}"#,
            r#"{"a": {"$size": [1]}}"#,
        ] {
            let result = compile_filter(text)?;
            assert!(
                matches!(result, Err(FilterError::MalformedOperand { .. })),
                "query {text} gave {result:?}"
            );
        }
        Ok(())
    }

    #[test]
    fn test_should_surface_depth_limit() -> anyhow::Result<()> {
        let query = parse_query(r#"{"a": {"b": {"c": {"$gt": 1}}}}"#)?;
        let builder = ExpressionBuilder::attribute().with_config(CompilerConfig { max_depth: 3 });
        let err = builder.build(&query).unwrap_err();
        assert_eq!(err.to_string(), "filter query nesting exceeds maximum depth of 3");
        Ok(())
    }

    #[test]
    fn test_should_report_invalid_query_text() {
        let err = parse_query("[1, 2]").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::Deserialize(_))
        ));

        let err = dynaquery_core::parse_filter_query("{").unwrap_err();
        assert!(err.to_string().starts_with("invalid filter query"));
    }
}
