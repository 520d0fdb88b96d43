//! # regform
//!
//! Bidirectional transformation engine for declarative registration forms.
//!
//! A form definition describes sections of fields, their visibility
//! conditionals and the named operations that move each value into and out of
//! the nested registration record (the bundle). The engine decides which
//! fields are shown, converts a flat draft into a bundle fragment and reads a
//! bundle back into a draft.
//!
//! ## Modules
//!
//! - `app` - Logging and configuration for the `regform` binary
//! - `bundle` - Bundle paths, merging, tagged record lists and the positional address layout
//! - `config` - Engine configuration loaded from TOML with environment overrides
//! - `engine` - Visibility, mutation and query pipelines behind [`FormEngine`]
//! - `error` - Unified error type with numeric codes
//! - `expression` - Conditional expression parser and evaluator
//! - `form` - Declarative form model and load-time validation
//! - `transform` - Operation registry and the built-in operations

pub mod app;
pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod expression;
pub mod form;
pub mod transform;

pub use config::{EngineConfig, ExpressionMode};
pub use engine::{Draft, FieldFailure, FieldState, FormEngine, MutationOutcome, QueryOutcome};
pub use error::{ErrorCode, FormError, Result};
pub use form::{FieldDefinition, FormDefinition, Operation, Section};
pub use transform::{Transformer, TransformerRegistry};
