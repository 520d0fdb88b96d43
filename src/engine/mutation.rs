//! Draft to bundle, one section at a time

use super::draft::Draft;
use super::nested::{self, Selection};
use super::visibility::VisibilityResolver;
use crate::bundle::deep_merge;
use crate::config::EngineConfig;
use crate::error::{FormError, Result};
use crate::expression::EvaluationContext;
use crate::form::{FieldDefinition, Section};
use crate::transform::{SectionLookup, TransformContext, TransformerRegistry};
use serde_json::Value;
use tracing::{debug, warn};

/// A field whose contribution was dropped from the fragment
#[derive(Debug)]
pub struct FieldFailure {
    pub section: String,
    /// Field name; nested fields read `parent.child`
    pub field: String,
    pub error: FormError,
}

impl std::fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.section, self.field, self.error)
    }
}

#[derive(Debug, Default)]
pub struct MutationOutcome {
    /// Bundle fragment, shaped from the bundle root
    pub fragment: Value,
    pub failures: Vec<FieldFailure>,
}

impl MutationOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another section's outcome into this one
    pub fn absorb(&mut self, other: MutationOutcome) {
        if self.fragment.is_null() {
            self.fragment = other.fragment;
        } else {
            deep_merge(&mut self.fragment, other.fragment);
        }
        self.failures.extend(other.failures);
    }
}

pub struct MutationPipeline<'a> {
    pub config: &'a EngineConfig,
    pub registry: &'a TransformerRegistry,
    pub visibility: VisibilityResolver<'a>,
    pub sections: &'a dyn SectionLookup,
}

impl<'a> MutationPipeline<'a> {
    /// Mutate every visible field of `section` in declaration order
    ///
    /// Each field works on a copy of the fragment built so far; a field that
    /// fails is rolled back and reported, and the remaining fields still run.
    pub fn run(&self, section: &Section, draft: &Draft, depth: usize) -> Result<MutationOutcome> {
        let scope = section.scope_path()?;
        let values = draft.section(&section.id);
        let context = EvaluationContext::new(draft.as_value(), values);
        let ctx = TransformContext::new(self.config, self.registry, draft, &section.id)
            .with_sections(self.sections)
            .at_depth(depth);

        let mut failures = Vec::new();
        let mut scoped = Value::Null;
        let mut mutated = 0usize;

        for group in &section.groups {
            if !self.visibility.group_visible(group, &context) {
                continue;
            }
            for field in &group.fields {
                if field.field_type.is_display_only() || !self.visibility.field_visible(field, &context) {
                    continue;
                }
                let value = values.get(&field.name).unwrap_or(&Value::Null);
                mutated += 1;

                if field.has_nested_fields() {
                    self.mutate_nested(field, value, &mut scoped, &context, &ctx, &mut failures);
                } else if let Some(operation) = field.mutation() {
                    let field_ctx = ctx.for_field(&field.name, field.extra_value.as_ref());
                    guarded(&mut scoped, &mut failures, &section.id, &field.name, |target| {
                        self.registry.mutate(operation, target, value, &field_ctx)
                    });
                }
            }
        }

        let mut fragment = Value::Null;
        if !scoped.is_null() {
            scope.set_in_place(&mut fragment, scoped)?;
        }

        if let Some(operation) = section.mapping.as_ref().and_then(|m| m.mutation.as_ref()) {
            let section_ctx = ctx.for_field(&section.id, None);
            guarded(&mut fragment, &mut failures, &section.id, "(section)", |target| {
                self.registry.mutate(operation, target, values, &section_ctx)
            });
        }

        debug!(
            "Mutated section '{}': {} fields, {} failed",
            section.id,
            mutated,
            failures.len()
        );
        Ok(MutationOutcome { fragment, failures })
    }

    fn mutate_nested(
        &self,
        field: &FieldDefinition,
        value: &Value,
        scoped: &mut Value,
        context: &EvaluationContext,
        ctx: &TransformContext,
        failures: &mut Vec<FieldFailure>,
    ) {
        let Some(selection) = Selection::of(value) else {
            return;
        };

        if let Some(operation) = field.mutation() {
            let field_ctx = ctx.for_field(&field.name, field.extra_value.as_ref());
            guarded(scoped, failures, ctx.section_id, &field.name, |target| {
                self.registry.mutate(operation, target, selection.value, &field_ctx)
            });
        }

        // Only the selected option's fields, stale values of other options stay out
        for child in field.nested_for(&selection.option) {
            if child.field_type.is_display_only() || !self.visibility.field_visible(child, context) {
                continue;
            }
            let child_value = selection.nested_value(&child.name);
            let label = format!("{}.{}", field.name, child.name);
            guarded(scoped, failures, ctx.section_id, &label, |target| {
                nested::mutate_child(child, &selection.option, child_value, target, ctx)
            });
        }
    }
}

/// Apply `write` to a copy of `accumulator`, keeping the copy only on success
fn guarded<F>(
    accumulator: &mut Value,
    failures: &mut Vec<FieldFailure>,
    section: &str,
    field: &str,
    write: F,
) where
    F: FnOnce(&mut Value) -> Result<()>,
{
    let mut working = accumulator.clone();
    match write(&mut working) {
        Ok(()) => *accumulator = working,
        Err(error) => {
            warn!("Dropping '{}.{}' from the bundle: {}", section, field, error);
            failures.push(FieldFailure {
                section: section.to_string(),
                field: field.to_string(),
                error,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;
    use serde_json::json;

    #[test]
    fn test_guarded_rolls_back_partial_writes() {
        let mut acc = json!({"name": [{"use": "en"}]});
        let mut failures = Vec::new();
        guarded(&mut acc, &mut failures, "child", "bad", |target| {
            target["name"] = json!("corrupted");
            Err(FormError::mismatch("boom"))
        });
        assert_eq!(acc, json!({"name": [{"use": "en"}]}));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].to_string(), "child.bad: [E3001] Transform mismatch: boom");

        guarded(&mut acc, &mut failures, "child", "good", |target| {
            target["birthDate"] = json!("2024-01-01");
            Ok(())
        });
        assert_eq!(acc["birthDate"], json!("2024-01-01"));
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn test_absorb_merges_fragments() {
        let mut outcome = MutationOutcome::default();
        outcome.absorb(MutationOutcome {
            fragment: json!({"mother": {"name": []}}),
            failures: Vec::new(),
        });
        outcome.absorb(MutationOutcome {
            fragment: json!({"father": {"name": []}}),
            failures: vec![FieldFailure {
                section: "father".into(),
                field: "x".into(),
                error: FormError::mismatch("boom"),
            }],
        });
        assert_eq!(outcome.fragment, json!({"mother": {"name": []}, "father": {"name": []}}));
        assert!(!outcome.is_complete());
    }
}
