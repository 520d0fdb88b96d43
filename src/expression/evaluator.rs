//! Expression evaluator
//!
//! Evaluates parsed expressions against an explicit [`EvaluationContext`]. Missing
//! paths evaluate to `null` and never raise, so guard chains like
//! `!draftData || !draftData.registration || ...` behave as they would in the
//! browser.

use super::ast::Expression;
use super::helpers::HelperRegistry;
use crate::bundle::PathSegment;
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::cmp::Ordering;

/// Variables visible to an expression
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Whole multi-section draft
    pub draft_data: &'a Value,
    /// Values of the section being evaluated
    pub values: &'a Value,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(draft_data: &'a Value, values: &'a Value) -> Self {
        Self { draft_data, values }
    }

    fn variable(&self, name: &str) -> Option<&'a Value> {
        match name {
            "draftData" => Some(self.draft_data),
            "values" => Some(self.values),
            _ => None,
        }
    }
}

/// JavaScript truthiness
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Clone, Debug)]
pub struct ExpressionEvaluator {
    helpers: HelperRegistry,
}

impl ExpressionEvaluator {
    pub fn new(helpers: HelperRegistry) -> Self {
        Self { helpers }
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Evaluate an expression and coerce the result to a boolean
    pub fn evaluate_bool(&self, expr: &Expression, context: &EvaluationContext) -> Result<bool> {
        Ok(is_truthy(&self.evaluate(expr, context)?))
    }

    pub fn evaluate(&self, expr: &Expression, context: &EvaluationContext) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Path(path) => Ok(self.resolve_path(path.segments(), context)),

            Expression::Equal(left, right) => {
                self.evaluate_binary_comparison(left, right, context, loose_equals)
            }
            Expression::NotEqual(left, right) => {
                self.evaluate_binary_comparison(left, right, context, |l, r| !loose_equals(l, r))
            }
            Expression::GreaterThan(left, right) => {
                self.evaluate_binary_comparison(left, right, context, |l, r| {
                    compare_values(l, r) == Some(Ordering::Greater)
                })
            }
            Expression::LessThan(left, right) => {
                self.evaluate_binary_comparison(left, right, context, |l, r| {
                    compare_values(l, r) == Some(Ordering::Less)
                })
            }
            Expression::GreaterEqual(left, right) => {
                self.evaluate_binary_comparison(left, right, context, |l, r| {
                    matches!(compare_values(l, r), Some(Ordering::Greater | Ordering::Equal))
                })
            }
            Expression::LessEqual(left, right) => {
                self.evaluate_binary_comparison(left, right, context, |l, r| {
                    matches!(compare_values(l, r), Some(Ordering::Less | Ordering::Equal))
                })
            }

            Expression::And(left, right) => self.evaluate_logical_and(left, right, context),
            Expression::Or(left, right) => self.evaluate_logical_or(left, right, context),
            Expression::Not(inner) => Ok(Value::Bool(!self.evaluate_bool(inner, context)?)),

            Expression::Call(name, args) => self.evaluate_call(name, args, context),
        }
    }

    /// Resolve a rooted path. Unknown roots and missing steps yield `null`.
    fn resolve_path(&self, segments: &[PathSegment], context: &EvaluationContext) -> Value {
        let Some((PathSegment::Key(root), rest)) = segments.split_first() else {
            return Value::Null;
        };
        let Some(mut current) = context.variable(root) else {
            return Value::Null;
        };

        for segment in rest {
            let next = match (segment, current) {
                (PathSegment::Key(k), Value::Object(obj)) => obj.get(k),
                (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i),
                (PathSegment::Key(k), Value::Array(arr)) if k == "length" => {
                    return Value::from(arr.len());
                }
                (PathSegment::Key(k), Value::String(s)) if k == "length" => {
                    return Value::from(s.chars().count());
                }
                _ => None,
            };
            match next {
                Some(v) => current = v,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    /// Logical AND with short-circuit evaluation
    fn evaluate_logical_and(
        &self,
        left: &Expression,
        right: &Expression,
        context: &EvaluationContext,
    ) -> Result<Value> {
        if !self.evaluate_bool(left, context)? {
            return Ok(Value::Bool(false));
        }
        Ok(Value::Bool(self.evaluate_bool(right, context)?))
    }

    /// Logical OR with short-circuit evaluation
    fn evaluate_logical_or(
        &self,
        left: &Expression,
        right: &Expression,
        context: &EvaluationContext,
    ) -> Result<Value> {
        if self.evaluate_bool(left, context)? {
            return Ok(Value::Bool(true));
        }
        Ok(Value::Bool(self.evaluate_bool(right, context)?))
    }

    fn evaluate_call(
        &self,
        name: &str,
        args: &[Expression],
        context: &EvaluationContext,
    ) -> Result<Value> {
        let helper = self
            .helpers
            .get(name)
            .ok_or_else(|| anyhow!("Unknown helper: {}", name))?;
        let values = args
            .iter()
            .map(|arg| self.evaluate(arg, context))
            .collect::<Result<Vec<_>>>()?;
        Ok(helper(&values))
    }

    fn evaluate_binary_comparison<F>(
        &self,
        left: &Expression,
        right: &Expression,
        context: &EvaluationContext,
        comparator: F,
    ) -> Result<Value>
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        let left_val = self.evaluate(left, context)?;
        let right_val = self.evaluate(right, context)?;
        Ok(Value::Bool(comparator(&left_val, &right_val)))
    }
}

/// Equality with numeric coercion between numbers and numeric strings
fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (a, b) => a == b,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(n), Value::String(s)) => n.as_f64()?.partial_cmp(&s.trim().parse().ok()?),
        (Value::String(s), Value::Number(n)) => s.trim().parse::<f64>().ok()?.partial_cmp(&n.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parser::ExpressionParser;
    use serde_json::json;

    fn eval(expr: &str, draft: &Value, values: &Value) -> bool {
        let parsed = ExpressionParser::new().parse(expr).unwrap();
        ExpressionEvaluator::new(HelperRegistry::with_defaults("FAR"))
            .evaluate_bool(&parsed, &EvaluationContext::new(draft, values))
            .unwrap()
    }

    #[test]
    fn test_guard_idiom_on_empty_draft() {
        let expr = "!draftData || !draftData.registration || draftData.registration.presentAtBirthRegistration !== 'BOTH_PARENTS'";
        assert!(eval(expr, &json!({}), &json!({})));
        assert!(eval(expr, &Value::Null, &Value::Null));
        assert!(!eval(
            expr,
            &json!({"registration": {"presentAtBirthRegistration": "BOTH_PARENTS"}}),
            &json!({})
        ));
    }

    #[test]
    fn test_missing_path_is_falsy_not_error() {
        assert!(!eval("values.a.b.c", &json!({}), &json!({"a": 1})));
        assert!(eval("values.a.b === undefined", &json!({}), &json!({})));
        assert!(eval("values.x == null", &json!({}), &json!({})));
    }

    #[test]
    fn test_nested_radio_value_access() {
        let values = json!({"informantType": {"value": "OTHER", "nestedFields": {"otherRelationShip": "Uncle"}}});
        assert!(eval("values.informantType.value === 'OTHER'", &json!({}), &values));
        assert!(eval(
            "values.informantType.nestedFields.otherRelationShip === 'Uncle'",
            &json!({}),
            &values
        ));
    }

    #[test]
    fn test_is_default_country_helper() {
        assert!(eval("isDefaultCountry(values.country)", &json!({}), &json!({"country": "FAR"})));
        assert!(eval(
            "values.country && !isDefaultCountry(values.country)",
            &json!({}),
            &json!({"country": "XYZ"})
        ));
        assert!(!eval("isDefaultCountry(values.country)", &json!({}), &json!({})));
    }

    #[test]
    fn test_numeric_comparisons() {
        let values = json!({"age": 17, "weight": "3.5"});
        assert!(eval("values.age < 18", &json!({}), &values));
        assert!(eval("values.weight >= 3", &json!({}), &values));
        assert!(eval("values.age == '17'", &json!({}), &values));
        assert!(!eval("values.missing > 1", &json!({}), &values));
    }

    #[test]
    fn test_length_pseudo_property() {
        let values = json!({"documents": [1, 2]});
        assert!(eval("values.documents.length === 2", &json!({}), &values));
    }

    #[test]
    fn test_unknown_helper_errors() {
        let parsed = ExpressionParser::new().parse("nope(values.a)").unwrap();
        let result = ExpressionEvaluator::new(HelperRegistry::new())
            .evaluate_bool(&parsed, &EvaluationContext::new(&json!({}), &json!({})));
        assert!(result.is_err());
    }

    #[test]
    fn test_short_circuit_skips_unknown_helper() {
        let parsed = ExpressionParser::new().parse("false && nope()").unwrap();
        let result = ExpressionEvaluator::new(HelperRegistry::new())
            .evaluate_bool(&parsed, &EvaluationContext::new(&json!({}), &json!({})));
        assert!(!result.unwrap());
    }
}
