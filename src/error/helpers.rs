use super::{ErrorCode, FormError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to a configuration error with the given message
    fn to_configuration_error(self, message: impl Into<String>) -> Result<T, FormError>;

    /// Convert to a transform mismatch for the given field
    fn to_mismatch(self, field: &str) -> Result<T, FormError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_configuration_error(self, message: impl Into<String>) -> Result<T, FormError> {
        self.map_err(|e| FormError::configuration(message).with_source(e))
    }

    fn to_mismatch(self, field: &str) -> Result<T, FormError> {
        self.map_err(|e| {
            FormError::mismatch(format!("conversion failed for '{}'", field))
                .with_field(field)
                .with_source(e)
        })
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    pub fn unknown_operation(name: &str, field: &str) -> FormError {
        FormError::configuration_with_code(
            ErrorCode::CONFIG_UNKNOWN_OPERATION,
            format!("operation '{}' is not registered", name),
        )
        .with_field(field)
    }

    pub fn unknown_section(id: &str) -> FormError {
        FormError::configuration_with_code(
            ErrorCode::CONFIG_UNKNOWN_SECTION,
            format!("section '{}' is not defined in this form", id),
        )
    }

    pub fn invalid_parameter(operation: &str, index: usize, expected: &str) -> FormError {
        FormError::configuration_with_code(
            ErrorCode::CONFIG_INVALID_PARAMETER,
            format!(
                "operation '{}' parameter {} must be {}",
                operation, index, expected
            ),
        )
    }
}
