use std::fmt::Display;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::ErrorExt;

/// The unified error type for the form engine
#[derive(Error, Debug)]
pub enum FormError {
    /// Broken form definition: unknown operation, malformed expression in strict mode,
    /// bad parameters. Raised at load time only.
    #[error("[E{code:04}] Configuration error: {message}")]
    Configuration {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Expression error: {message}")]
    Expression {
        code: u16,
        message: String,
        expression: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A transform produced (or met) a value outside the expected bundle shape.
    #[error("[E{code:04}] Transform mismatch: {message}")]
    TransformMismatch {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A query could not find the data it looks for. Recovered by the query pipeline.
    #[error("[E{code:04}] Missing data: {message}")]
    MissingData {
        code: u16,
        message: String,
        field: Option<String>,
    },

    #[error("[E{code:04}] Path error: {message}")]
    Path {
        code: u16,
        message: String,
        path: String,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl FormError {
    /// Create a configuration error with default code
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::configuration_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn configuration_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Configuration {
            code,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create an expression error for the given expression text
    pub fn expression(message: impl Into<String>, expression: impl Into<String>) -> Self {
        Self::Expression {
            code: ErrorCode::EXPR_SYNTAX,
            message: message.into(),
            expression: Some(expression.into()),
            source: None,
        }
    }

    /// Create an expression error with specific code and no expression text
    pub fn expression_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Expression {
            code,
            message: message.into(),
            expression: None,
            source: None,
        }
    }

    /// Create a transform mismatch error
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::TransformMismatch {
            code: ErrorCode::TRANSFORM_MISMATCH,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create a transform error with a specific code
    pub fn transform_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::TransformMismatch {
            code,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    /// Create a missing data warning
    pub fn missing(message: impl Into<String>) -> Self {
        Self::MissingData {
            code: ErrorCode::TRANSFORM_MISSING_DATA,
            message: message.into(),
            field: None,
        }
    }

    /// Create a bundle path error
    pub fn path(code: u16, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Path {
            code,
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Configuration { source: src, .. }
            | Self::Expression { source: src, .. }
            | Self::TransformMismatch { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::MissingData { .. } | Self::Path { .. } => {}
        }
        self
    }

    /// Attach the field name the error belongs to
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Self::Configuration { field, .. }
            | Self::TransformMismatch { field, .. }
            | Self::MissingData { field, .. } => {
                *field = Some(name.into());
            }
            _ => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Configuration { message, .. }
            | Self::Expression { message, .. }
            | Self::TransformMismatch { message, .. }
            | Self::MissingData { message, .. }
            | Self::Path { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Configuration { code, .. }
            | Self::Expression { code, .. }
            | Self::TransformMismatch { code, .. }
            | Self::MissingData { code, .. }
            | Self::Path { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Field the error is attached to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Configuration { field, .. }
            | Self::TransformMismatch { field, .. }
            | Self::MissingData { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Errors a pipeline absorbs per field instead of failing the section
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TransformMismatch { .. } | Self::MissingData { .. } | Self::Path { .. }
        )
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { message, field, .. } => match field {
                Some(f) => format!("Form definition problem in '{}': {}", f, message),
                None => format!("Form definition problem: {}", message),
            },
            Self::Expression {
                message,
                expression,
                ..
            } => match expression {
                Some(e) => format!("Invalid condition '{}': {}", e, message),
                None => format!("Invalid condition: {}", message),
            },
            Self::TransformMismatch { message, field, .. } => match field {
                Some(f) => format!("Could not convert '{}': {}", f, message),
                None => format!("Could not convert value: {}", message),
            },
            Self::MissingData { message, .. } => message.clone(),
            Self::Path { message, path, .. } => format!("Bad path '{}': {}", path, message),
            Self::Other { message, .. } => message.clone(),
        }
    }
}

/// Type alias for Results using FormError
pub type Result<T> = std::result::Result<T, FormError>;

impl From<serde_yaml::Error> for FormError {
    fn from(err: serde_yaml::Error) -> Self {
        FormError::configuration_with_code(ErrorCode::CONFIG_INVALID_YAML, "Invalid YAML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::configuration_with_code(ErrorCode::CONFIG_INVALID_JSON, "Invalid JSON syntax")
            .with_source(err)
    }
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        FormError::configuration_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<std::io::Error> for FormError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::CONFIG_NOT_FOUND,
            _ => ErrorCode::OTHER_IO,
        };
        FormError::Other {
            code,
            message: "I/O operation failed".to_string(),
            source: Some(Box::new(err)),
        }
    }
}
