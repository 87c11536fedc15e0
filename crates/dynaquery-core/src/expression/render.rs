//! Rendering of condition trees into DynamoDB expression text.
//!
//! Attribute names become `#nN` placeholders and literals become `:vN`
//! placeholders, which sidesteps reserved words and escaping entirely. A name
//! used several times shares one placeholder; every literal gets its own.

use std::collections::{BTreeMap, HashMap};

use dynaquery_model::AttributeValue;
use serde::{Deserialize, Serialize};

use super::ast::{AttributePath, Condition, Operand, PathElement};

/// A condition rendered as expression text plus its placeholder bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderedExpression {
    /// Expression text, e.g. `(#n0 = :v0 AND attribute_exists(#n1))`.
    pub expression: String,
    /// `#placeholder` to attribute name.
    #[serde(rename = "ExpressionAttributeNames")]
    pub names: BTreeMap<String, String>,
    /// `:placeholder` to literal.
    #[serde(rename = "ExpressionAttributeValues")]
    pub values: BTreeMap<String, AttributeValue>,
}

/// Render `condition` into expression text.
#[must_use]
pub fn render(condition: &Condition) -> RenderedExpression {
    let mut renderer = Renderer::default();
    let expression = renderer.condition(condition);
    RenderedExpression {
        expression,
        names: renderer
            .names
            .into_iter()
            .map(|(name, placeholder)| (placeholder, name))
            .collect(),
        values: renderer.values,
    }
}

#[derive(Debug, Default)]
struct Renderer {
    names: HashMap<String, String>,
    values: BTreeMap<String, AttributeValue>,
}

impl Renderer {
    fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Compare { left, op, right } => {
                let left = self.operand(left);
                let right = self.operand(right);
                format!("{left} {op} {right}")
            }
            Condition::Between { value, low, high } => {
                let value = self.operand(value);
                let low = self.operand(low);
                let high = self.operand(high);
                format!("{value} BETWEEN {low} AND {high}")
            }
            Condition::In { value, list } => {
                let value = self.operand(value);
                let list: Vec<_> = list.iter().map(|item| self.operand(item)).collect();
                format!("{value} IN ({})", list.join(", "))
            }
            Condition::Logical { op, left, right } => {
                let left = self.condition(left);
                let right = self.condition(right);
                format!("({left} {op} {right})")
            }
            Condition::Not(inner) => format!("(NOT {})", self.condition(inner)),
            Condition::Function { name, args } => {
                let args: Vec<_> = args.iter().map(|arg| self.operand(arg)).collect();
                format!("{name}({})", args.join(", "))
            }
        }
    }

    fn operand(&mut self, operand: &Operand) -> String {
        match operand {
            Operand::Path(path) => self.path(path),
            Operand::Value(value) => self.value(value),
            Operand::Size(inner) => format!("size({})", self.operand(inner)),
        }
    }

    fn path(&mut self, path: &AttributePath) -> String {
        let mut out = String::new();
        for element in &path.elements {
            match element {
                PathElement::Attribute(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&self.name(name));
                }
                PathElement::Index(idx) => {
                    out.push('[');
                    out.push_str(&idx.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    fn name(&mut self, name: &str) -> String {
        let next = self.names.len();
        self.names
            .entry(name.to_owned())
            .or_insert_with(|| format!("#n{next}"))
            .clone()
    }

    fn value(&mut self, value: &AttributeValue) -> String {
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }
}
