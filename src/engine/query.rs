//! Bundle to draft, the inverse of the mutation pipeline
//!
//! A query never fails past this boundary for a known section: any field that
//! cannot be resolved falls back to its `initialValue` and is reported as a
//! warning, so the caller always receives a complete draft fragment.

use super::draft::Draft;
use super::nested;
use crate::bundle::is_present;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::form::{FieldDefinition, Section};
use crate::transform::{SectionLookup, TransformContext, TransformerRegistry};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    /// Flat field values of the section
    pub values: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

pub struct QueryPipeline<'a> {
    pub config: &'a EngineConfig,
    pub registry: &'a TransformerRegistry,
    pub sections: &'a dyn SectionLookup,
}

impl<'a> QueryPipeline<'a> {
    pub fn run(&self, section: &Section, bundle: &Value) -> Result<QueryOutcome> {
        let scope = section.scope_path()?;
        let scoped = scope.get(bundle).unwrap_or(&Value::Null);
        let empty = Draft::new();
        let ctx = TransformContext::new(self.config, self.registry, &empty, &section.id)
            .with_sections(self.sections)
            .with_bundle(bundle);

        let mut values = Map::new();
        let mut warnings = Vec::new();

        for field in section.fields() {
            if field.field_type.is_display_only() {
                continue;
            }
            let resolved = if field.has_nested_fields() {
                self.query_nested(field, scoped, &ctx, &mut warnings)
            } else {
                self.query_field(field, scoped, &ctx, &mut warnings)
            };
            match resolved {
                Some(value) => {
                    values.insert(field.name.clone(), value);
                }
                None if !field.initial_value.is_null() => {
                    values.insert(field.name.clone(), field.initial_value.clone());
                }
                None => {}
            }
        }

        if let Some(operation) = section.mapping.as_ref().and_then(|m| m.query_operation()) {
            let section_ctx = ctx.for_field(&section.id, None);
            match self.registry.query(operation, bundle, &section_ctx) {
                Ok(Some(Value::Object(extra))) => {
                    for (key, value) in extra {
                        values.entry(key).or_insert(value);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Section '{}' query failed: {}", section.id, e);
                    warnings.push(format!("{}: {}", section.id, e));
                }
            }
        }

        debug!(
            "Queried section '{}': {} values, {} warnings",
            section.id,
            values.len(),
            warnings.len()
        );
        Ok(QueryOutcome {
            values: Value::Object(values),
            warnings,
        })
    }

    fn query_field(
        &self,
        field: &FieldDefinition,
        source: &Value,
        ctx: &TransformContext,
        warnings: &mut Vec<String>,
    ) -> Option<Value> {
        let operation = field.query()?;
        // Mutation-only operations have nothing to read back
        if field.mapping.as_ref().is_some_and(|m| m.query.is_none())
            && !self
                .registry
                .get(&operation.operation)
                .is_some_and(|t| t.supports_query())
        {
            return None;
        }

        let field_ctx = ctx.for_field(&field.name, field.extra_value.as_ref());
        match self.registry.query(operation, source, &field_ctx) {
            Ok(value) => value.filter(is_present),
            Err(e) => {
                warn!(
                    "'{}.{}' falls back to its initial value: {}",
                    ctx.section_id, field.name, e
                );
                warnings.push(format!("{}.{}: {}", ctx.section_id, field.name, e));
                None
            }
        }
    }

    fn query_nested(
        &self,
        field: &FieldDefinition,
        source: &Value,
        ctx: &TransformContext,
        warnings: &mut Vec<String>,
    ) -> Option<Value> {
        let selected = self.query_field(field, source, ctx, warnings);
        let outcome = nested::query(field, selected, source, ctx);
        for (child, error) in outcome.failures {
            warn!(
                "'{}.{}.{}' falls back to its initial value: {}",
                ctx.section_id, field.name, child, error
            );
            warnings.push(format!("{}.{}.{}: {}", ctx.section_id, field.name, child, error));
        }
        outcome.value
    }
}
