//! Declarative form model
//!
//! A form is a list of sections, each a list of groups of fields. Fields carry
//! conditionals (hide/enable/disable predicates) and a `mapping` naming the
//! operations that move their value into and out of the bundle. The model is
//! loaded once and never mutated afterwards.

pub mod field;
pub mod operation;
pub mod section;
pub mod validation;

pub use field::{
    Conditional, ConditionalAction, FieldDefinition, FieldMapping, FieldOption, FieldType,
};
pub use operation::{Operation, Parameter};
pub use section::{FormDefinition, Group, Section};
pub use validation::{FormValidator, ValidationReport};
