//! Flat per-section form values

use crate::bundle::path::kind_of;
use crate::error::{FormError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static ABSENT: Value = Value::Null;

/// Section id to field name to value
///
/// Leaves are scalars or arrays of scalars. The one structured value is a
/// radio with nested fields: `{ "value": <option>, "nestedFields": { .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft {
    data: Value,
}

impl Default for Draft {
    fn default() -> Self {
        Self {
            data: Value::Object(Map::new()),
        }
    }
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) => Ok(Self { data: value }),
            Value::Null => Ok(Self::new()),
            other => Err(FormError::mismatch(format!(
                "draft must be an object of sections, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// The whole draft, as seen by `draftData` in conditionals
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    pub fn into_value(self) -> Value {
        self.data
    }

    /// Values of one section; `null` when the section has none
    pub fn section(&self, id: &str) -> &Value {
        self.data.get(id).unwrap_or(&ABSENT)
    }

    pub fn set_section(&mut self, id: impl Into<String>, values: Value) {
        if let Value::Object(sections) = &mut self.data {
            sections.insert(id.into(), values);
        }
    }

    pub fn value(&self, section: &str, field: &str) -> &Value {
        self.section(section).get(field).unwrap_or(&ABSENT)
    }

    pub fn set_value(&mut self, section: &str, field: impl Into<String>, value: Value) {
        if let Value::Object(sections) = &mut self.data {
            let slot = sections
                .entry(section.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(fields) = slot {
                fields.insert(field.into(), value);
            }
        }
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &String> {
        self.data.as_object().into_iter().flat_map(|m| m.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_access() {
        let mut draft = Draft::from_value(json!({"registration": {"contactPoint": "MOTHER"}})).unwrap();
        assert_eq!(draft.value("registration", "contactPoint"), &json!("MOTHER"));
        assert!(draft.section("mother").is_null());

        draft.set_value("mother", "firstNames", json!("Jane"));
        assert_eq!(draft.section("mother"), &json!({"firstNames": "Jane"}));
        assert_eq!(draft.section_ids().count(), 2);
    }

    #[test]
    fn test_rejects_non_object() {
        assert!(Draft::from_value(json!([1, 2])).is_err());
        assert_eq!(Draft::from_value(Value::Null).unwrap(), Draft::new());
    }

    #[test]
    fn test_serializes_transparently() {
        let draft = Draft::from_value(json!({"child": {"gender": "female"}})).unwrap();
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({"child": {"gender": "female"}})
        );
    }
}
