//! Attribute dialect end-to-end tests.

#[cfg(test)]
mod tests {
    use std::thread;

    use dynaquery_core::Condition;
    use dynaquery_model::AttributeValue;

    use crate::{compile_filter, render_filter};

    #[test]
    fn test_should_compile_documented_scenarios() -> anyhow::Result<()> {
        assert_eq!(compile_filter(r#"{"foo": "bar"}"#)??, Condition::eq("foo", "bar"));
        assert_eq!(
            compile_filter(r#"{"foo": {"$between": [1, 3]}}"#)??,
            Condition::between("foo", 1, 3)
        );
        assert_eq!(
            compile_filter(r#"{"$or": [{"x": "foo"}, {"y": "bar"}]}"#)??,
            Condition::eq("x", "foo").or(Condition::eq("y", "bar"))
        );
        assert_eq!(
            compile_filter(r#"{"$xor": [{"x": "foo"}, {"y": "bar"}]}"#)??,
            Condition::eq("x", "foo")
                .and(!Condition::eq("y", "bar"))
                .or(!Condition::eq("x", "foo") & Condition::eq("y", "bar"))
        );
        assert_eq!(
            compile_filter(r#"{"foo": {"$lt": 1, "$exists": true}}"#)??,
            Condition::lt("foo", 1) & Condition::exists("foo")
        );
        Ok(())
    }

    #[test]
    fn test_should_compile_mixed_query() -> anyhow::Result<()> {
        let text = r#"{
            "status": "active",
            "age": {"$gte": 21, "$lt": 65},
            "$or": [
                {"tags": {"$contains": "vip"}},
                {"$nor": [{"country": {"$in": ["FR", "DE"]}}]}
            ]
        }"#;
        let expected = Condition::eq("status", "active")
            & (Condition::gte("age", 21) & Condition::lt("age", 65))
            & (Condition::contains("tags", "vip")
                | !Condition::is_in(
                    "country",
                    vec![AttributeValue::from("FR"), AttributeValue::from("DE")],
                ));
        assert_eq!(compile_filter(text)??, expected);
        Ok(())
    }

    #[test]
    fn test_should_ignore_clause_order_semantically() -> anyhow::Result<()> {
        let ab = compile_filter(r#"{"a": 1, "b": 2, "c": {"$ne": 3}}"#)??;
        let cba = compile_filter(r#"{"c": {"$ne": 3}, "b": 2, "a": 1}"#)??;
        assert!(ab.equivalent(&cba));
        Ok(())
    }

    #[test]
    fn test_should_render_filter_expression() -> anyhow::Result<()> {
        let rendered = render_filter(r#"{"name": {"$startsWith": "Jo"}, "age": {"$gt": 30}}"#)?;
        assert_eq!(rendered.expression, "(begins_with(#n0, :v0) AND #n1 > :v1)");
        assert_eq!(rendered.names.get("#n0").map(String::as_str), Some("name"));
        assert_eq!(rendered.names.get("#n1").map(String::as_str), Some("age"));
        assert_eq!(rendered.values.get(":v1"), Some(&AttributeValue::N("30".to_owned())));
        Ok(())
    }

    #[test]
    fn test_should_render_reserved_word_fields_through_placeholders() -> anyhow::Result<()> {
        let rendered = render_filter(r#"{"size": {"$size": 2}, "data.count": 4}"#)?;
        assert_eq!(rendered.expression, "(size(#n0) = :v0 AND #n1.#n2 = :v1)");
        assert_eq!(rendered.names.len(), 3);
        Ok(())
    }

    #[test]
    fn test_should_compile_concurrently() -> anyhow::Result<()> {
        let text = r#"{"x": {"$between": [1, 10]}, "$not": [{"y": "z"}]}"#;
        let expected = compile_filter(text)??;

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| compile_filter(text)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("compile thread panicked"))
                .collect()
        });

        for result in results {
            assert_eq!(result??, expected);
        }
        Ok(())
    }
}
