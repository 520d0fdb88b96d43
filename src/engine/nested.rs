//! Radio groups whose options reveal their own nested fields
//!
//! In the draft such a field holds `{ "value": <option>, "nestedFields": { .. } }`
//! (a bare option value is accepted too). Only the nested fields of the selected
//! option take part in a mutation. A query rebuilds the selection either from
//! the radio's own operation or, failing that, from the first option whose
//! nested fields find data in the bundle.

use crate::bundle::is_present;
use crate::error::Result;
use crate::form::FieldDefinition;
use crate::transform::TransformContext;
use serde_json::{json, Map, Value};
use tracing::debug;

static ABSENT: Value = Value::Null;

/// The selected option of a nested radio value
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub option: String,
    /// Selected value as stored in the draft
    pub value: &'a Value,
    nested: &'a Value,
}

impl<'a> Selection<'a> {
    /// `None` when nothing is selected
    pub fn of(value: &'a Value) -> Option<Self> {
        let (selected, nested) = match value {
            Value::Object(obj) => (
                obj.get("value").unwrap_or(&ABSENT),
                obj.get("nestedFields").unwrap_or(&ABSENT),
            ),
            scalar => (scalar, &ABSENT),
        };
        let option = match selected {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        Some(Self {
            option,
            value: selected,
            nested,
        })
    }

    pub fn nested_value(&self, name: &str) -> &'a Value {
        self.nested.get(name).unwrap_or(&ABSENT)
    }
}

/// Tag a nested field writes its records under: its `extraValue`, else the option
fn tag_for(child: &FieldDefinition, option: &str) -> Value {
    child
        .extra_value
        .clone()
        .unwrap_or_else(|| Value::String(option.to_string()))
}

/// Apply one nested field's mutation with its discriminator in context
pub fn mutate_child(
    child: &FieldDefinition,
    option: &str,
    value: &Value,
    target: &mut Value,
    ctx: &TransformContext,
) -> Result<()> {
    let Some(operation) = child.mutation() else {
        return Ok(());
    };
    let tag = tag_for(child, option);
    let ctx = ctx.for_field(&child.name, Some(&tag));
    ctx.registry.mutate(operation, target, value, &ctx)
}

/// Query one nested field with its discriminator in context
pub fn query_child(
    child: &FieldDefinition,
    option: &str,
    source: &Value,
    ctx: &TransformContext,
) -> Result<Option<Value>> {
    let Some(operation) = child.query() else {
        return Ok(None);
    };
    if let Some(transformer) = ctx.registry.get(&operation.operation) {
        if !transformer.supports_query() {
            return Ok(None);
        }
    }
    let tag = tag_for(child, option);
    let ctx = ctx.for_field(&child.name, Some(&tag));
    ctx.registry.query(operation, source, &ctx)
}

/// Outcome of querying a nested radio
#[derive(Debug, Default)]
pub struct NestedQuery {
    /// Draft value of the radio, `None` when no option could be determined
    pub value: Option<Value>,
    /// Nested field failures, as `(field, error)`
    pub failures: Vec<(String, crate::error::FormError)>,
}

/// Rebuild a nested radio value from the bundle
///
/// `selected` is what the radio's own query operation returned, if it has one.
pub fn query(
    field: &FieldDefinition,
    selected: Option<Value>,
    source: &Value,
    ctx: &TransformContext,
) -> NestedQuery {
    let mut outcome = NestedQuery::default();

    let collect = |option: &str, outcome: &mut NestedQuery| -> Map<String, Value> {
        let mut nested = Map::new();
        for child in field.nested_for(option) {
            match query_child(child, option, source, ctx) {
                Ok(Some(value)) if is_present(&value) => {
                    nested.insert(child.name.clone(), value);
                }
                Ok(_) => {
                    if !child.initial_value.is_null() {
                        nested.insert(child.name.clone(), child.initial_value.clone());
                    }
                }
                Err(e) => outcome.failures.push((child.name.clone(), e)),
            }
        }
        nested
    };

    let selection = selected.as_ref().and_then(Selection::of).map(|s| s.option);
    let (option, nested) = match selection {
        Some(option) => {
            let nested = collect(&option, &mut outcome);
            (option, nested)
        }
        None => {
            let mut found = None;
            for option in field.option_keys() {
                let has_data = field.nested_for(&option).iter().any(|child| {
                    matches!(query_child(child, &option, source, ctx), Ok(Some(v)) if is_present(&v))
                });
                if has_data {
                    let nested = collect(&option, &mut outcome);
                    found = Some((option, nested));
                    break;
                }
            }
            match found {
                Some(found) => {
                    debug!("{}: selection '{}' inferred from bundle data", field.name, found.0);
                    found
                }
                None => return outcome,
            }
        }
    };

    let value = selected.unwrap_or_else(|| Value::String(option));
    outcome.value = Some(json!({ "value": value, "nestedFields": nested }));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Draft;
    use crate::transform::TransformerRegistry;

    fn caregiver_field() -> FieldDefinition {
        let mut field: FieldDefinition = serde_json::from_value(json!({
            "name": "primaryCaregiverType",
            "type": "RADIO_GROUP_WITH_NESTED_FIELDS",
            "options": [{"value": "MOTHER"}, {"value": "OTHER"}],
            "nestedFields": {
                "MOTHER": [{
                    "name": "reasonMotherNotApplying",
                    "type": "TEXT",
                    "mapping": {"mutation": {"operation": "reasonNotApplying", "parameters": ["reasonNotApplying"]}}
                }],
                "OTHER": [{
                    "name": "reasonNotApplying",
                    "type": "TEXT",
                    "mapping": {"mutation": {"operation": "reasonNotApplying", "parameters": ["reasonNotApplying"]}}
                }]
            }
        }))
        .unwrap();
        field.nested_fields.get_mut("OTHER").unwrap()[0].initial_value = json!("");
        field
    }

    #[test]
    fn test_selection_shapes() {
        let full = json!({"value": "OTHER", "nestedFields": {"x": 1}});
        let selection = Selection::of(&full).unwrap();
        assert_eq!(selection.option, "OTHER");
        assert_eq!(selection.nested_value("x"), &json!(1));
        assert_eq!(selection.nested_value("y"), &Value::Null);

        assert_eq!(Selection::of(&json!("MOTHER")).unwrap().option, "MOTHER");
        assert!(Selection::of(&json!("")).is_none());
        assert!(Selection::of(&json!({"value": null})).is_none());
    }

    #[test]
    fn test_query_infers_selection_from_tagged_data() {
        let config = EngineConfig::default();
        let registry = TransformerRegistry::with_builtins();
        let draft = Draft::new();
        let ctx = TransformContext::new(&config, &registry, &draft, "primaryCaregiver");
        let bundle = json!({"reasonsNotApplying": [
            {"primaryCaregiverType": "OTHER", "reasonNotApplying": "travelling"}
        ]});

        let outcome = query(&caregiver_field(), None, &bundle, &ctx);
        assert_eq!(
            outcome.value,
            Some(json!({"value": "OTHER", "nestedFields": {"reasonNotApplying": "travelling"}}))
        );
        assert!(outcome.failures.is_empty());

        let nothing = query(&caregiver_field(), None, &json!({}), &ctx);
        assert_eq!(nothing.value, None);
    }

    #[test]
    fn test_query_with_explicit_selection_uses_initial_values() {
        let config = EngineConfig::default();
        let registry = TransformerRegistry::with_builtins();
        let draft = Draft::new();
        let ctx = TransformContext::new(&config, &registry, &draft, "primaryCaregiver");

        let outcome = query(&caregiver_field(), Some(json!("OTHER")), &json!({}), &ctx);
        assert_eq!(
            outcome.value,
            Some(json!({"value": "OTHER", "nestedFields": {"reasonNotApplying": ""}}))
        );
    }

    #[test]
    fn test_mutate_child_tags_with_option() {
        let config = EngineConfig::default();
        let registry = TransformerRegistry::with_builtins();
        let draft = Draft::new();
        let ctx = TransformContext::new(&config, &registry, &draft, "primaryCaregiver");
        let field = caregiver_field();

        let mut target = Value::Null;
        let child = &field.nested_for("MOTHER")[0];
        mutate_child(child, "MOTHER", &json!("deceased"), &mut target, &ctx).unwrap();
        assert_eq!(
            target,
            json!({"reasonsNotApplying": [{"primaryCaregiverType": "MOTHER", "reasonNotApplying": "deceased"}]})
        );
    }
}
