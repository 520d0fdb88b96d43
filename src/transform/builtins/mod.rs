//! Built-in operations
//!
//! | operation | parameters |
//! |---|---|
//! | `fieldName` | `[path?]` |
//! | `nest` | `[key, inner?]` |
//! | `arrayWrap` | `[path?]` |
//! | `name` | `[lang?, part]` |
//! | `identifier` | `[idType, idField?]` |
//! | `address` | `[addressType, lineOrKey]` |
//! | `eventLocationType` | `[]` |
//! | `eventLocationFacility` | `[discriminatorField]` |
//! | `eventLocationAddress` | `[discriminatorField, lineOrKey]` |
//! | `copyAddress` | `[fromType, toType, fromSection?]` |
//! | `reasonNotApplying` | `[property]` |
//! | `registrationSection` | `[eventType]` |
//!
//! Every mutation skips absent input (`null`, `""`, empty list) instead of
//! writing it.

mod address;
mod copy_address;
mod event_location;
mod field;
mod identity;
mod reasons;
mod section;

use super::registry::TransformerRegistry;
use crate::bundle::path::kind_of;
use crate::error::{FormError, Result};
use serde_json::Value;
use std::sync::Arc;

pub use address::AddressTransformer;
pub use copy_address::CopyAddressTransformer;
pub use event_location::{
    EventLocationAddressTransformer, EventLocationFacilityTransformer,
    EventLocationTypeTransformer, HEALTH_FACILITY,
};
pub use field::{ArrayWrapTransformer, FieldNameTransformer, NestTransformer};
pub use identity::{IdentifierTransformer, NameTransformer};
pub use reasons::{ReasonNotApplyingTransformer, CAREGIVER_TYPE_KEY, REASONS_KEY};
pub use section::RegistrationSectionTransformer;

pub fn register_all(registry: &mut TransformerRegistry) {
    registry.register_transformer(Arc::new(FieldNameTransformer));
    registry.register_transformer(Arc::new(NestTransformer));
    registry.register_transformer(Arc::new(ArrayWrapTransformer));
    registry.register_transformer(Arc::new(NameTransformer));
    registry.register_transformer(Arc::new(IdentifierTransformer));
    registry.register_transformer(Arc::new(AddressTransformer));
    registry.register_transformer(Arc::new(EventLocationTypeTransformer));
    registry.register_transformer(Arc::new(EventLocationFacilityTransformer));
    registry.register_transformer(Arc::new(EventLocationAddressTransformer));
    registry.register_transformer(Arc::new(CopyAddressTransformer));
    registry.register_transformer(Arc::new(ReasonNotApplyingTransformer));
    registry.register_transformer(Arc::new(RegistrationSectionTransformer));
}

/// Scalar form value as text, for bundle slots that only hold strings
fn scalar_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(FormError::mismatch(format!(
            "expected a text value, found {}",
            kind_of(other)
        ))
        .with_field(field)),
    }
}

/// `true`, or the checkbox spelling `"true"`
fn is_checked(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}
