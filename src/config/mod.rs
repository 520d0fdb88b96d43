//! Engine configuration
//!
//! Settings that change how forms are interpreted rather than what they contain:
//! the country treated as local, how malformed conditionals are handled, and the
//! recursion guard for cross-section operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod loader;

pub use loader::ConfigLoader;

/// How the engine treats a conditional expression that fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionMode {
    /// Reject the form definition at load time
    Strict,
    /// Log a warning and evaluate the condition as `false`
    #[default]
    Permissive,
}

impl std::str::FromStr for ExpressionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("unknown expression mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Country code treated as local by `isDefaultCountry` and address branching
    pub default_country: String,
    pub expression_mode: ExpressionMode,
    /// Maximum nesting of operations that evaluate another section
    pub max_section_depth: usize,
    /// Name language used when a name operation omits one
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_country: "FAR".to_string(),
            expression_mode: ExpressionMode::Permissive,
            max_section_depth: 4,
            language: "en".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_default_country(mut self, country: impl Into<String>) -> Self {
        self.default_country = country.into();
        self
    }

    pub fn with_expression_mode(mut self, mode: ExpressionMode) -> Self {
        self.expression_mode = mode;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.expression_mode == ExpressionMode::Strict
    }

    /// Apply `REGFORM_*` environment overrides
    pub fn merge_env_vars(&mut self) {
        if let Ok(country) = std::env::var("REGFORM_DEFAULT_COUNTRY") {
            if !country.trim().is_empty() {
                debug!("Default country overridden from environment: {}", country);
                self.default_country = country.trim().to_string();
            }
        }
        if let Ok(mode) = std::env::var("REGFORM_EXPRESSION_MODE") {
            match mode.parse() {
                Ok(mode) => self.expression_mode = mode,
                Err(e) => tracing::warn!("Ignoring REGFORM_EXPRESSION_MODE: {}", e),
            }
        }
    }
}
