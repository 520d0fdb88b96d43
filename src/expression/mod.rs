//! Conditional expressions for field visibility and requiredness
//!
//! Form definitions carry JavaScript-like predicates such as
//! `!values.informantType || values.informantType.value !== 'OTHER'`. They are
//! parsed into a typed AST once, when the form engine is built, then evaluated
//! against `draftData` (whole draft) and `values` (current section).
//!
//! Supported:
//! - Comparison operators: `==`, `===`, `!=`, `!==`, `>`, `<`, `>=`, `<=`
//! - Logical operators: `&&`, `||`, `!`
//! - Literals: strings, numbers, `true`, `false`, `null`, `undefined`
//! - Helper calls: `isDefaultCountry(x)`, `includes(list, x)`, `isEmpty(x)`,
//!   and method syntax `list.includes(x)`

pub mod ast;
pub mod evaluator;
pub mod helpers;
pub mod parser;
pub mod tokenizer;
pub mod validator;

pub use ast::Expression;
pub use evaluator::{is_truthy, EvaluationContext, ExpressionEvaluator};
pub use helpers::HelperRegistry;
pub use parser::ExpressionParser;
pub use validator::{ExpressionIssue, ExpressionValidator};

use crate::config::{EngineConfig, ExpressionMode};
use crate::error::{ErrorCode, FormError, Result};
use serde_json::Value;
use tracing::warn;

/// A conditional compiled at load time
///
/// `expression` is `None` when the source failed to compile in permissive mode;
/// such a condition always evaluates to `false`.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    source: String,
    expression: Option<Expression>,
}

impl CompiledCondition {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.expression.is_some()
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }
}

/// Parses, validates and evaluates conditionals under one [`ExpressionMode`]
#[derive(Debug, Clone)]
pub struct ExpressionEngine {
    parser: ExpressionParser,
    validator: ExpressionValidator,
    evaluator: ExpressionEvaluator,
    mode: ExpressionMode,
}

impl ExpressionEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_helpers(
            HelperRegistry::with_defaults(&config.default_country),
            config.expression_mode,
        )
    }

    pub fn with_helpers(helpers: HelperRegistry, mode: ExpressionMode) -> Self {
        Self {
            parser: ExpressionParser::new(),
            validator: ExpressionValidator::new(),
            evaluator: ExpressionEvaluator::new(helpers),
            mode,
        }
    }

    pub fn mode(&self) -> ExpressionMode {
        self.mode
    }

    /// Parse and validate without applying the mode policy
    pub fn parse(&self, source: &str) -> Result<Expression> {
        let to_form_error = |e: anyhow::Error| FormError::Expression {
            code: e
                .downcast_ref::<ExpressionIssue>()
                .map_or(ErrorCode::EXPR_SYNTAX, ExpressionIssue::code),
            message: e.to_string(),
            expression: Some(source.to_string()),
            source: None,
        };
        let ast = self.parser.parse(source).map_err(to_form_error)?;
        self.validator
            .validate(&ast, self.evaluator.helpers())
            .map_err(to_form_error)?;
        Ok(ast)
    }

    /// Compile a conditional
    ///
    /// Strict mode turns a malformed expression into a configuration error.
    /// Permissive mode logs it and yields a condition that is always `false`.
    pub fn compile(&self, source: &str) -> Result<CompiledCondition> {
        match self.parse(source) {
            Ok(expression) => Ok(CompiledCondition {
                source: source.to_string(),
                expression: Some(expression),
            }),
            Err(e) if self.mode == ExpressionMode::Strict => Err(FormError::configuration_with_code(
                ErrorCode::CONFIG_VALIDATION_FAILED,
                format!("invalid conditional expression '{}'", source),
            )
            .with_source(e)),
            Err(e) => {
                warn!("Conditional '{}' will evaluate to false: {}", source, e);
                Ok(CompiledCondition {
                    source: source.to_string(),
                    expression: None,
                })
            }
        }
    }

    /// Evaluate a compiled condition, surfacing runtime failures
    pub fn try_evaluate(
        &self,
        condition: &CompiledCondition,
        context: &EvaluationContext,
    ) -> Result<bool> {
        let Some(expression) = condition.expression() else {
            return Ok(false);
        };
        self.evaluator
            .evaluate_bool(expression, context)
            .map_err(|e| FormError::expression(e.to_string(), condition.source()))
    }

    /// Evaluate a compiled condition; failures count as `false`
    pub fn evaluate(&self, condition: &CompiledCondition, context: &EvaluationContext) -> bool {
        self.try_evaluate(condition, context).unwrap_or_else(|e| {
            warn!("Conditional '{}' failed: {}", condition.source(), e);
            false
        })
    }

    /// One-shot compile and evaluate of expression text
    pub fn evaluate_str(&self, source: &str, draft_data: &Value, values: &Value) -> Result<bool> {
        let condition = self.compile(source)?;
        Ok(self.evaluate(&condition, &EvaluationContext::new(draft_data, values)))
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
