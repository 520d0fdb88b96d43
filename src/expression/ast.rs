//! Abstract Syntax Tree for conditional expressions
//!
//! Data-only types, separate from parsing and evaluation.

use crate::bundle::BundlePath;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `undefined` is represented as `Value::Null`
    Literal(Value),

    /// Path rooted at a context variable (`draftData`, `values`)
    Path(BundlePath),

    // Comparison operators
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    LessThan(Box<Expression>, Box<Expression>),
    GreaterEqual(Box<Expression>, Box<Expression>),
    LessEqual(Box<Expression>, Box<Expression>),

    // Logical operators
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),

    /// Registered helper predicate, e.g. `isDefaultCountry(values.country)`.
    /// Method syntax `a.b.includes(x)` is desugared to `includes(a.b, x)`.
    Call(String, Vec<Expression>),
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }
}
