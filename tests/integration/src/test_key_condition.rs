//! Key dialect end-to-end tests.

#[cfg(test)]
mod tests {
    use dynaquery_core::{Condition, render};
    use dynaquery_model::AttributeValue;

    use crate::compile_key;

    #[test]
    fn test_should_compile_partition_and_sort_key() -> anyhow::Result<()> {
        let cond = compile_key(r#"{"pk": "user#1", "sk": {"$between": ["2024-01", "2024-12"]}}"#)??;
        assert_eq!(
            cond,
            Condition::eq("pk", "user#1") & Condition::between("sk", "2024-01", "2024-12")
        );
        assert_eq!(
            cond.attribute_names().into_iter().collect::<Vec<_>>(),
            ["pk", "sk"]
        );

        let rendered = render(&cond);
        assert_eq!(rendered.expression, "(#n0 = :v0 AND #n1 BETWEEN :v1 AND :v2)");
        Ok(())
    }

    #[test]
    fn test_should_compile_prefix_sort_key() -> anyhow::Result<()> {
        let cond = compile_key(r#"{"pk": {"$eq": 7}, "sk": {"$startsWith": "order#"}}"#)??;
        assert_eq!(
            cond,
            Condition::eq("pk", 7) & Condition::begins_with("sk", "order#")
        );
        Ok(())
    }

    #[test]
    fn test_should_downgrade_attribute_only_operators_to_equality() -> anyhow::Result<()> {
        assert_eq!(
            compile_key(r#"{"pk": {"$ne": "a"}}"#)??,
            Condition::eq("pk", "a")
        );
        assert_eq!(
            compile_key(r#"{"pk": {"$nin": ["a"]}}"#)??,
            Condition::eq("pk", AttributeValue::from(vec!["a"]))
        );
        Ok(())
    }

    #[test]
    fn test_should_not_interpret_logical_combinators() -> anyhow::Result<()> {
        let cond = compile_key(r#"{"$and": [{"pk": "a"}]}"#)??;
        assert!(
            matches!(cond, Condition::Compare { .. }),
            "expected a single comparison, got {cond}"
        );
        assert_eq!(cond.attribute_names().into_iter().collect::<Vec<_>>(), ["$and"]);
        Ok(())
    }
}
