use super::field::{Conditional, FieldDefinition, FieldMapping};
use crate::bundle::BundlePath;
use crate::error::{ErrorCode, FormError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,

    #[serde(default)]
    pub fields: Vec<FieldDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditionals: Vec<Conditional>,

    /// Review-page aggregation, not interpreted by the engine
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preview_groups: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,

    /// Bundle path field operations of this section write under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    #[serde(default)]
    pub groups: Vec<Group>,

    /// Section-level operation run once over the collected field values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<FieldMapping>,
}

impl Section {
    pub fn scope_path(&self) -> Result<BundlePath> {
        match &self.scope {
            Some(scope) => BundlePath::parse(scope),
            None => Ok(BundlePath::root()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.groups.iter().flat_map(|g| g.fields.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    #[serde(default)]
    pub version: String,

    /// Event type the form registers, e.g. `birth`
    #[serde(default)]
    pub event: String,

    pub sections: Vec<Section>,
}

impl FormDefinition {
    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FormError::configuration_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("cannot read form definition {}", path.display()),
            )
            .with_source(e)
        })?;

        let form = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };
        debug!(
            "Loaded form '{}' v{} from {} ({} sections)",
            form.event,
            form.version,
            path.display(),
            form.sections.len()
        );
        Ok(form)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut form: FormDefinition = serde_json::from_str(content)?;
        form.normalize();
        Ok(form)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut form: FormDefinition = serde_yaml::from_str(content)?;
        form.normalize();
        Ok(form)
    }

    /// Tag every nested field with the option that reveals it, unless it already
    /// declares an `extraValue`
    pub fn normalize(&mut self) {
        for section in &mut self.sections {
            for group in &mut section.groups {
                for field in &mut group.fields {
                    normalize_field(field);
                }
            }
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}

fn normalize_field(field: &mut FieldDefinition) {
    for (option, nested) in &mut field.nested_fields {
        for child in nested.iter_mut() {
            if child.extra_value.is_none() {
                child.extra_value = Some(Value::String(option.clone()));
            }
            normalize_field(child);
        }
    }
}
