use super::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Input widget kind. Only display-only kinds and nested radios change how the
/// engine treats a field; unknown kinds are kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    TextArea,
    Number,
    Tel,
    Date,
    Checkbox,
    CheckboxGroup,
    RadioGroup,
    RadioGroupWithNestedFields,
    SelectWithOptions,
    SelectWithDynamicOptions,
    DocumentUploaderWithOption,
    LocationSearchInput,
    Subsection,
    Paragraph,
    Warning,
    Other(String),
}

impl FieldType {
    const NAMES: [(&'static str, FieldType); 16] = [
        ("TEXT", FieldType::Text),
        ("TEXTAREA", FieldType::TextArea),
        ("NUMBER", FieldType::Number),
        ("TEL", FieldType::Tel),
        ("DATE", FieldType::Date),
        ("CHECKBOX", FieldType::Checkbox),
        ("CHECKBOX_GROUP", FieldType::CheckboxGroup),
        ("RADIO_GROUP", FieldType::RadioGroup),
        ("RADIO_GROUP_WITH_NESTED_FIELDS", FieldType::RadioGroupWithNestedFields),
        ("SELECT_WITH_OPTIONS", FieldType::SelectWithOptions),
        ("SELECT_WITH_DYNAMIC_OPTIONS", FieldType::SelectWithDynamicOptions),
        ("DOCUMENT_UPLOADER_WITH_OPTION", FieldType::DocumentUploaderWithOption),
        ("LOCATION_SEARCH_INPUT", FieldType::LocationSearchInput),
        ("SUBSECTION", FieldType::Subsection),
        ("PARAGRAPH", FieldType::Paragraph),
        ("WARNING", FieldType::Warning),
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Other(name) => name,
            known => Self::NAMES
                .iter()
                .find(|(_, t)| t == known)
                .map(|(name, _)| *name)
                .unwrap_or("UNKNOWN"),
        }
    }

    /// Fields that carry no value of their own
    pub fn is_display_only(&self) -> bool {
        matches!(
            self,
            FieldType::Subsection | FieldType::Paragraph | FieldType::Warning
        )
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        Self::NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, t)| t.clone())
            .unwrap_or(FieldType::Other(name))
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionalAction {
    Hide,
    Enable,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    pub action: ConditionalAction,
    pub expression: String,
}

impl Conditional {
    pub fn hide(expression: impl Into<String>) -> Self {
        Self {
            action: ConditionalAction::Hide,
            expression: expression.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub label: Value,
}

impl FieldOption {
    /// Option value as the key used in `nestedFields`
    pub fn key(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Operation>,
}

impl FieldMapping {
    /// Operation used in the query direction: the explicit one, else the mutation's
    pub fn query_operation(&self) -> Option<&Operation> {
        self.query.as_ref().or(self.mutation.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub initial_value: Value,

    /// Validation rules, enforced by the UI layer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validate: Vec<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditionals: Vec<Conditional>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub nested_fields: BTreeMap<String, Vec<FieldDefinition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<FieldMapping>,

    /// Discriminator a nested field tags its bundle record with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_value: Option<Value>,

    /// Presentation keys (label, placeholder, ...) the engine passes through
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            initial_value: Value::Null,
            validate: Vec::new(),
            conditionals: Vec::new(),
            options: Vec::new(),
            nested_fields: BTreeMap::new(),
            mapping: None,
            extra_value: None,
            extra: Map::new(),
        }
    }

    pub fn with_mutation(mut self, operation: Operation) -> Self {
        self.mapping.get_or_insert_with(FieldMapping::default).mutation = Some(operation);
        self
    }

    pub fn with_conditional(mut self, conditional: Conditional) -> Self {
        self.conditionals.push(conditional);
        self
    }

    pub fn mutation(&self) -> Option<&Operation> {
        self.mapping.as_ref().and_then(|m| m.mutation.as_ref())
    }

    pub fn query(&self) -> Option<&Operation> {
        self.mapping.as_ref().and_then(FieldMapping::query_operation)
    }

    pub fn has_nested_fields(&self) -> bool {
        self.field_type == FieldType::RadioGroupWithNestedFields
    }

    /// Nested fields revealed by an option
    pub fn nested_for(&self, option: &str) -> &[FieldDefinition] {
        self.nested_fields
            .get(option)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Option keys in declaration order, followed by nested-field keys with no option entry
    pub fn option_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.options.iter().map(FieldOption::key).collect();
        for key in self.nested_fields.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Every operation this field references, including nested fields
    pub fn operations(&self) -> Vec<&Operation> {
        let mut ops = Vec::new();
        if let Some(mapping) = &self.mapping {
            ops.extend(mapping.mutation.iter());
            ops.extend(mapping.query.iter());
        }
        for nested in self.nested_fields.values().flatten() {
            ops.extend(nested.operations());
        }
        ops
    }
}
