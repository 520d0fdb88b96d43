//! Static checks on parsed conditionals

use super::ast::Expression;
use super::helpers::HelperRegistry;
use crate::bundle::PathSegment;
use crate::error::ErrorCode;
use anyhow::{anyhow, Result};
use thiserror::Error;

/// Deepest nesting a conditional may reach, in the parser and here
pub const MAX_DEPTH: usize = 100;
const ROOT_VARIABLES: [&str; 2] = ["draftData", "values"];

/// Rejections that map to their own error code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionIssue {
    #[error("Expression too deeply nested (max depth: {max})")]
    TooDeep { max: usize },

    #[error("Unknown helper: {0}")]
    UnknownHelper(String),
}

impl ExpressionIssue {
    pub fn too_deep() -> Self {
        Self::TooDeep { max: MAX_DEPTH }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::TooDeep { .. } => ErrorCode::EXPR_TOO_DEEP,
            Self::UnknownHelper(_) => ErrorCode::EXPR_UNKNOWN_HELPER,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExpressionValidator;

impl ExpressionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate an expression against the helpers it may call
    pub fn validate(&self, expr: &Expression, helpers: &HelperRegistry) -> Result<()> {
        self.validate_expression(expr, helpers, 0)
    }

    fn validate_expression(
        &self,
        expr: &Expression,
        helpers: &HelperRegistry,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(ExpressionIssue::too_deep().into());
        }

        match expr {
            Expression::Literal(_) => Ok(()),

            Expression::Path(path) => match path.segments().first() {
                Some(PathSegment::Key(root)) if ROOT_VARIABLES.contains(&root.as_str()) => Ok(()),
                Some(other) => Err(anyhow!(
                    "Unknown variable: {} (expected draftData or values)",
                    other
                )),
                None => Err(anyhow!("Empty path")),
            },

            Expression::Equal(left, right)
            | Expression::NotEqual(left, right)
            | Expression::GreaterThan(left, right)
            | Expression::LessThan(left, right)
            | Expression::GreaterEqual(left, right)
            | Expression::LessEqual(left, right)
            | Expression::And(left, right)
            | Expression::Or(left, right) => {
                self.validate_expression(left, helpers, depth + 1)?;
                self.validate_expression(right, helpers, depth + 1)
            }

            Expression::Not(inner) => self.validate_expression(inner, helpers, depth + 1),

            Expression::Call(name, args) => {
                if !helpers.contains(name) {
                    return Err(ExpressionIssue::UnknownHelper(name.clone()).into());
                }
                args.iter()
                    .try_for_each(|arg| self.validate_expression(arg, helpers, depth + 1))
            }
        }
    }

    /// Paths read by an expression, sorted and deduplicated
    pub fn accessed_paths(&self, expr: &Expression) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths(expr, &mut paths);
        paths.sort();
        paths.dedup();
        paths
    }

    fn collect_paths(&self, expr: &Expression, paths: &mut Vec<String>) {
        match expr {
            Expression::Path(path) => paths.push(path.to_string()),
            Expression::Equal(left, right)
            | Expression::NotEqual(left, right)
            | Expression::GreaterThan(left, right)
            | Expression::LessThan(left, right)
            | Expression::GreaterEqual(left, right)
            | Expression::LessEqual(left, right)
            | Expression::And(left, right)
            | Expression::Or(left, right) => {
                self.collect_paths(left, paths);
                self.collect_paths(right, paths);
            }
            Expression::Not(inner) => self.collect_paths(inner, paths),
            Expression::Call(_, args) => {
                for arg in args {
                    self.collect_paths(arg, paths);
                }
            }
            Expression::Literal(_) => {}
        }
    }
}
