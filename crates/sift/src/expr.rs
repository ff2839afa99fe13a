//! Expression trees describing predicates as data.
//!
//! An [`Expression`] is one of three node kinds:
//!
//! - [`Expression::Value`]: a literal, only meaningful as the right-hand side
//!   of a comparison;
//! - [`Expression::Comparison`]: `field <operator> value`;
//! - [`Expression::Composite`]: AND / OR / NOT over child expressions.
//!
//! Nodes are immutable once built. Building an expression never evaluates it;
//! see [`ExpressionEvaluator`](crate::ExpressionEvaluator) for that.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SiftError};
use crate::value::Value;

/// Comparison operator.
///
/// - **Equality**: `Eq`, `Neq` (strict, no coercion)
/// - **Ordering**: `Lt`, `Lte`, `Gt`, `Gte`
/// - **Membership**: `In`, `Nin` (field in literal list), `MemberOf` (literal in field)
/// - **Text**: `Contains`, `StartsWith`, `EndsWith`, `Matches`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal.
    Eq,
    /// Not equal.
    Neq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Field value is one of the listed values.
    In,
    /// Field value is none of the listed values.
    Nin,
    /// Field text contains the literal text.
    Contains,
    /// Literal occurs within the field's list or map.
    MemberOf,
    /// Field text starts with the literal text.
    StartsWith,
    /// Field text ends with the literal text.
    EndsWith,
    /// Field text matches the literal regular expression.
    Matches,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 13] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::In,
        Operator::Nin,
        Operator::Contains,
        Operator::MemberOf,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Matches,
    ];

    /// Returns `true` for `Lt`, `Lte`, `Gt` and `Gte`.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte
        )
    }

    /// Returns `true` for operators that test the field's text.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            Operator::Contains | Operator::StartsWith | Operator::EndsWith | Operator::Matches
        )
    }

    /// Evaluates an ordering operator given the field-vs-literal ordering.
    pub fn eval_ordering(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering;
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Neq => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the symbol or keyword of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
            Operator::Nin => "NIN",
            Operator::Contains => "CONTAINS",
            Operator::MemberOf => "MEMBER_OF",
            Operator::StartsWith => "STARTS_WITH",
            Operator::EndsWith => "ENDS_WITH",
            Operator::Matches => "MATCHES",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses symbols (`=`, `<>`, `!=`, `<`, ...) and keywords, case-insensitively.
impl FromStr for Operator {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" | "EQ" | "IS" => Operator::Eq,
            "<>" | "!=" | "NEQ" | "NE" => Operator::Neq,
            "<" | "LT" => Operator::Lt,
            "<=" | "LTE" => Operator::Lte,
            ">" | "GT" => Operator::Gt,
            ">=" | "GTE" => Operator::Gte,
            "IN" => Operator::In,
            "NIN" | "NOT IN" | "NOT_IN" => Operator::Nin,
            "CONTAINS" => Operator::Contains,
            "MEMBER_OF" | "MEMBER OF" => Operator::MemberOf,
            "STARTS_WITH" | "STARTSWITH" => Operator::StartsWith,
            "ENDS_WITH" | "ENDSWITH" => Operator::EndsWith,
            "MATCHES" | "REGEX" => Operator::Matches,
            _ => {
                return Err(SiftError::invalid_expression(format!(
                    "unknown comparison operator '{}'",
                    s
                )))
            }
        };
        Ok(op)
    }
}

/// A single `field <operator> value` predicate.
///
/// # Example
///
/// ```
/// use sift::{Comparison, Operator, Value};
///
/// let cmp = Comparison::new("name", Operator::Contains, "test");
/// assert_eq!(cmp.field(), "name");
/// assert_eq!(cmp.value(), &Value::from("test"));
///
/// let parsed = Comparison::parse("age", ">=", 18).unwrap();
/// assert_eq!(parsed.operator(), Operator::Gte);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    field: String,
    operator: Operator,
    value: Value,
}

impl Comparison {
    /// Creates a new comparison.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Comparison {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates a comparison from an operator given as text.
    ///
    /// Fails with [`SiftError::InvalidExpression`] naming an unknown operator.
    pub fn parse(field: impl Into<String>, operator: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Comparison::new(field, operator.parse()?, value))
    }

    /// The field path being compared.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The right-hand side literal.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.operator)?;
        write_literal(f, &self.value)
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{:?}", s),
        Value::Null => f.write_str("null"),
        Value::List(items) => {
            f.write_str("(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_literal(f, item)?;
            }
            f.write_str(")")
        }
        other => write!(f, "{}", other),
    }
}

/// Logical combinator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// All children must hold. No children: true.
    And,
    /// At least one child must hold. No children: false.
    Or,
    /// The single child must not hold.
    Not,
}

impl CompositeKind {
    /// Returns the keyword of this combinator.
    pub fn as_str(self) -> &'static str {
        match self {
            CompositeKind::And => "AND",
            CompositeKind::Or => "OR",
            CompositeKind::Not => "NOT",
        }
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// AND / OR / NOT over child expressions.
///
/// Construction validates the shape: `Not` takes exactly one child and no
/// child may be a bare [`Expression::Value`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeExpression {
    kind: CompositeKind,
    children: Vec<Expression>,
}

impl CompositeExpression {
    /// Creates a validated composite expression.
    pub fn new(kind: CompositeKind, children: Vec<Expression>) -> Result<Self> {
        if kind == CompositeKind::Not && children.len() != 1 {
            return Err(SiftError::invalid_expression(format!(
                "NOT takes exactly one child, got {}",
                children.len()
            )));
        }
        if let Some(position) = children
            .iter()
            .position(|child| matches!(child, Expression::Value(_)))
        {
            return Err(SiftError::invalid_expression(format!(
                "child {} of {} is a bare value, not a predicate",
                position, kind
            )));
        }
        Ok(CompositeExpression { kind, children })
    }

    /// Builds without validation; callers guarantee the shape.
    pub(crate) fn from_parts(kind: CompositeKind, children: Vec<Expression>) -> Self {
        debug_assert!(kind != CompositeKind::Not || children.len() == 1);
        CompositeExpression { kind, children }
    }

    /// The combinator kind.
    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// The child expressions, in order.
    pub fn children(&self) -> &[Expression] {
        &self.children
    }
}

impl fmt::Display for CompositeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == CompositeKind::Not {
            return write!(f, "NOT ({})", self.children[0]);
        }
        f.write_str("(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.kind)?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal; valid only as a comparison operand.
    Value(Value),
    /// A field comparison.
    Comparison(Comparison),
    /// A logical combination of child expressions.
    Composite(CompositeExpression),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Value(value) => write_literal(f, value),
            Expression::Comparison(cmp) => write!(f, "{}", cmp),
            Expression::Composite(composite) => write!(f, "{}", composite),
        }
    }
}

impl From<Comparison> for Expression {
    fn from(cmp: Comparison) -> Self {
        Expression::Comparison(cmp)
    }
}

impl From<CompositeExpression> for Expression {
    fn from(composite: CompositeExpression) -> Self {
        Expression::Composite(composite)
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Value(value)
    }
}
