//! Condition tree produced by the filter compiler.
//!
//! The node set mirrors DynamoDB's condition-expression grammar: comparisons,
//! `BETWEEN`, `IN`, the built-in functions, and `AND`/`OR`/`NOT`. Values are
//! carried inline; rendering swaps them for placeholders when the
//! tree is turned into expression text.

use std::collections::BTreeSet;
use std::fmt;
use std::ops;

use dynaquery_model::AttributeValue;

/// Boolean condition over the attributes of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Comparison: `left op right`.
    Compare {
        /// Left-hand operand.
        left: Box<Operand>,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Box<Operand>,
    },
    /// Inclusive range: `value BETWEEN low AND high`.
    Between {
        /// Value to test.
        value: Box<Operand>,
        /// Lower bound (inclusive).
        low: Box<Operand>,
        /// Upper bound (inclusive).
        high: Box<Operand>,
    },
    /// Membership: `value IN (list...)`.
    In {
        /// Value to search for.
        value: Box<Operand>,
        /// Candidate values.
        list: Vec<Operand>,
    },
    /// `left AND right` or `left OR right`.
    Logical {
        /// Logical operator.
        op: LogicalOp,
        /// Left-hand condition.
        left: Box<Condition>,
        /// Right-hand condition.
        right: Box<Condition>,
    },
    /// `NOT inner`.
    Not(Box<Condition>),
    /// Function call: `function_name(args...)`.
    Function {
        /// Function name.
        name: FunctionName,
        /// Function arguments.
        args: Vec<Operand>,
    },
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "<>"),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Binary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Built-in DynamoDB condition functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    /// `attribute_exists(path)`.
    AttributeExists,
    /// `attribute_not_exists(path)`.
    AttributeNotExists,
    /// `attribute_type(path, type)`.
    AttributeType,
    /// `begins_with(path, prefix)`.
    BeginsWith,
    /// `contains(path, operand)`: substring or set/list element.
    Contains,
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeExists => write!(f, "attribute_exists"),
            Self::AttributeNotExists => write!(f, "attribute_not_exists"),
            Self::AttributeType => write!(f, "attribute_type"),
            Self::BeginsWith => write!(f, "begins_with"),
            Self::Contains => write!(f, "contains"),
        }
    }
}

/// An operand in a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A document path reference (e.g., `info.rating`, `myList[0]`).
    Path(AttributePath),
    /// A literal value.
    Value(AttributeValue),
    /// `size(operand)`.
    Size(Box<Operand>),
}

impl Operand {
    fn path(field: &str) -> Self {
        Self::Path(AttributePath::parse(field))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{path}"),
            Self::Value(value) => write!(f, "{value}"),
            Self::Size(inner) => write!(f, "size({inner})"),
        }
    }
}

/// A document path consisting of one or more elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// The path elements in order.
    pub elements: Vec<PathElement>,
}

impl AttributePath {
    /// Split a field name into path elements.
    ///
    /// Dots separate nested attributes and `[n]` suffixes dereference list
    /// indexes, so `info.tags[2]` becomes `info`, `tags`, `[2]`. A segment
    /// whose brackets do not hold a plain index is kept verbatim.
    #[must_use]
    pub fn parse(field: &str) -> Self {
        let mut elements = Vec::new();
        for segment in field.split('.') {
            match split_indexes(segment) {
                Some((name, indexes)) => {
                    elements.push(PathElement::Attribute(name.to_owned()));
                    elements.extend(indexes.into_iter().map(PathElement::Index));
                }
                None => elements.push(PathElement::Attribute(segment.to_owned())),
            }
        }
        Self { elements }
    }

    /// The top-level attribute name.
    #[must_use]
    pub fn root(&self) -> Option<&str> {
        match self.elements.first() {
            Some(PathElement::Attribute(name)) => Some(name),
            _ => None,
        }
    }
}

fn split_indexes(segment: &str) -> Option<(&str, Vec<usize>)> {
    let open = segment.find('[')?;
    let (name, mut rest) = segment.split_at(open);
    if name.is_empty() {
        return None;
    }
    let mut indexes = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indexes.push(inner[..close].parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((name, indexes))
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elements.iter().enumerate() {
            match elem {
                PathElement::Attribute(name) => {
                    if i > 0 {
                        write!(f, ".{name}")?;
                    } else {
                        write!(f, "{name}")?;
                    }
                }
                PathElement::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// A single element in an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A named attribute.
    Attribute(String),
    /// A list index dereference (e.g., `[0]`).
    Index(usize),
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

impl Condition {
    /// `field op value`.
    #[must_use]
    pub fn compare(field: &str, op: CompareOp, value: AttributeValue) -> Self {
        Self::Compare {
            left: Box::new(Operand::path(field)),
            op,
            right: Box::new(Operand::Value(value)),
        }
    }

    /// `field = value`.
    #[must_use]
    pub fn eq(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value.into())
    }

    /// `field <> value`.
    #[must_use]
    pub fn ne(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Ne, value.into())
    }

    /// `field < value`.
    #[must_use]
    pub fn lt(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Lt, value.into())
    }

    /// `field <= value`.
    #[must_use]
    pub fn lte(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Le, value.into())
    }

    /// `field > value`.
    #[must_use]
    pub fn gt(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Gt, value.into())
    }

    /// `field >= value`.
    #[must_use]
    pub fn gte(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::compare(field, CompareOp::Ge, value.into())
    }

    /// `field BETWEEN low AND high`.
    #[must_use]
    pub fn between(
        field: &str,
        low: impl Into<AttributeValue>,
        high: impl Into<AttributeValue>,
    ) -> Self {
        Self::Between {
            value: Box::new(Operand::path(field)),
            low: Box::new(Operand::Value(low.into())),
            high: Box::new(Operand::Value(high.into())),
        }
    }

    /// `field IN (list...)`.
    #[must_use]
    pub fn is_in(field: &str, list: Vec<AttributeValue>) -> Self {
        Self::In {
            value: Box::new(Operand::path(field)),
            list: list.into_iter().map(Operand::Value).collect(),
        }
    }

    /// `contains(field, value)`.
    #[must_use]
    pub fn contains(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::function(FunctionName::Contains, field, Some(value.into()))
    }

    /// `attribute_exists(field)`.
    #[must_use]
    pub fn exists(field: &str) -> Self {
        Self::function(FunctionName::AttributeExists, field, None)
    }

    /// `attribute_not_exists(field)`.
    #[must_use]
    pub fn not_exists(field: &str) -> Self {
        Self::function(FunctionName::AttributeNotExists, field, None)
    }

    /// `size(field) = value`.
    #[must_use]
    pub fn size_eq(field: &str, value: impl Into<AttributeValue>) -> Self {
        Self::Compare {
            left: Box::new(Operand::Size(Box::new(Operand::path(field)))),
            op: CompareOp::Eq,
            right: Box::new(Operand::Value(value.into())),
        }
    }

    /// `begins_with(field, prefix)`.
    #[must_use]
    pub fn begins_with(field: &str, prefix: impl Into<AttributeValue>) -> Self {
        Self::function(FunctionName::BeginsWith, field, Some(prefix.into()))
    }

    /// `attribute_type(field, type_tag)`.
    #[must_use]
    pub fn attribute_type(field: &str, type_tag: impl Into<AttributeValue>) -> Self {
        Self::function(FunctionName::AttributeType, field, Some(type_tag.into()))
    }

    fn function(name: FunctionName, field: &str, arg: Option<AttributeValue>) -> Self {
        let mut args = vec![Operand::path(field)];
        args.extend(arg.map(Operand::Value));
        Self::Function { name, args }
    }

    // -----------------------------------------------------------------------
    // Combinators
    // -----------------------------------------------------------------------

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// `NOT self`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Canonical form in which chains of the same logical operator are
    /// flattened and their operands sorted, so `a AND b` and `b AND a`
    /// normalize to the same tree.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::Logical { op, .. } => {
                let mut operands = Vec::new();
                self.flatten(*op, &mut operands);
                let mut operands: Vec<Self> = operands.into_iter().map(Self::normalized).collect();
                operands.sort_by_cached_key(ToString::to_string);
                let mut iter = operands.into_iter();
                let first = iter.next().unwrap_or_else(|| self.clone());
                iter.fold(first, |acc, next| Self::Logical {
                    op: *op,
                    left: Box::new(acc),
                    right: Box::new(next),
                })
            }
            Self::Not(inner) => Self::Not(Box::new(inner.normalized())),
            leaf => leaf.clone(),
        }
    }

    /// Returns `true` if both conditions are equal up to the order of
    /// AND/OR operands.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }

    fn flatten<'a>(&'a self, op: LogicalOp, out: &mut Vec<&'a Self>) {
        match self {
            Self::Logical {
                op: node_op,
                left,
                right,
            } if *node_op == op => {
                left.flatten(op, out);
                right.flatten(op, out);
            }
            other => out.push(other),
        }
    }

    /// Collect the top-level attribute name of every path in the condition.
    #[must_use]
    pub fn attribute_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        collect_names(self, &mut names);
        names
    }
}

fn collect_names(condition: &Condition, names: &mut BTreeSet<String>) {
    match condition {
        Condition::Compare { left, right, .. } => {
            collect_names_from_operand(left, names);
            collect_names_from_operand(right, names);
        }
        Condition::Between { value, low, high } => {
            collect_names_from_operand(value, names);
            collect_names_from_operand(low, names);
            collect_names_from_operand(high, names);
        }
        Condition::In { value, list } => {
            collect_names_from_operand(value, names);
            for item in list {
                collect_names_from_operand(item, names);
            }
        }
        Condition::Logical { left, right, .. } => {
            collect_names(left, names);
            collect_names(right, names);
        }
        Condition::Not(inner) => collect_names(inner, names),
        Condition::Function { args, .. } => {
            for arg in args {
                collect_names_from_operand(arg, names);
            }
        }
    }
}

fn collect_names_from_operand(operand: &Operand, names: &mut BTreeSet<String>) {
    match operand {
        Operand::Path(path) => {
            if let Some(root) = path.root() {
                names.insert(root.to_owned());
            }
        }
        Operand::Value(_) => {}
        Operand::Size(inner) => collect_names_from_operand(inner, names),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { left, op, right } => write!(f, "{left} {op} {right}"),
            Self::Between { value, low, high } => write!(f, "{value} BETWEEN {low} AND {high}"),
            Self::In { value, list } => {
                write!(f, "{value} IN (")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Self::Logical { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Not(inner) => write!(f, "NOT ({inner})"),
            Self::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl ops::BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl ops::BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl ops::Not for Condition {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_nested_path() {
        let path = AttributePath::parse("info.tags[2][0]");
        assert_eq!(
            path.elements,
            vec![
                PathElement::Attribute("info".to_owned()),
                PathElement::Attribute("tags".to_owned()),
                PathElement::Index(2),
                PathElement::Index(0),
            ]
        );
        assert_eq!(path.to_string(), "info.tags[2][0]");
    }

    #[test]
    fn test_should_keep_malformed_index_segment_verbatim() {
        let path = AttributePath::parse("weird[x]");
        assert_eq!(path.elements, vec![PathElement::Attribute("weird[x]".to_owned())]);
    }

    #[test]
    fn test_should_display_leaf_conditions() {
        assert_eq!(Condition::eq("foo", "bar").to_string(), r#"foo = "bar""#);
        assert_eq!(Condition::between("n", 1, 3).to_string(), "n BETWEEN 1 AND 3");
        assert_eq!(Condition::size_eq("l", 2).to_string(), "size(l) = 2");
        assert_eq!(Condition::exists("a").to_string(), "attribute_exists(a)");
        assert_eq!(
            Condition::is_in("x", vec![1.into(), 2.into()]).to_string(),
            "x IN (1, 2)"
        );
    }

    #[test]
    fn test_should_combine_with_operator_traits() {
        let a = Condition::eq("a", 1);
        let b = Condition::eq("b", 2);
        assert_eq!(a.clone() & b.clone(), a.clone().and(b.clone()));
        assert_eq!(a.clone() | b.clone(), a.clone().or(b.clone()));
        assert_eq!(!a.clone(), a.negate());
    }

    #[test]
    fn test_should_treat_reordered_conjunction_as_equivalent() {
        let ab = Condition::eq("a", 1).and(Condition::eq("b", 2));
        let ba = Condition::eq("b", 2).and(Condition::eq("a", 1));
        assert_ne!(ab, ba);
        assert!(ab.equivalent(&ba));
    }

    #[test]
    fn test_should_order_binary_operands_by_content() {
        let binary = |encoded: &str| -> AttributeValue {
            serde_json::from_value(serde_json::json!({ "B": encoded })).unwrap()
        };
        let ab = Condition::eq("a", binary("YWI=")).and(Condition::eq("a", binary("Y2Q=")));
        let ba = Condition::eq("a", binary("Y2Q=")).and(Condition::eq("a", binary("YWI=")));
        assert!(ab.equivalent(&ba));
        assert_eq!(ab.normalized(), ba.normalized());
    }

    #[test]
    fn test_should_not_mix_and_with_or_when_normalizing() {
        let left = Condition::eq("a", 1).and(Condition::eq("b", 2).or(Condition::eq("c", 3)));
        let right = Condition::eq("a", 1)
            .and(Condition::eq("b", 2))
            .or(Condition::eq("c", 3));
        assert!(!left.equivalent(&right));
    }

    #[test]
    fn test_should_collect_attribute_names() {
        let cond = Condition::eq("pk", "x").and(Condition::begins_with("sk.part", "2024"));
        let names: Vec<_> = cond.attribute_names().into_iter().collect();
        assert_eq!(names, ["pk", "sk"]);
    }
}
