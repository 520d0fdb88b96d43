//! What an operation can see besides its own value and parameters

use super::registry::TransformerRegistry;
use crate::bundle::BundlePath;
use crate::config::EngineConfig;
use crate::engine::Draft;
use crate::error::{ErrorCode, FormError, Result};
use serde_json::Value;

/// Access to other sections of the same form, for cross-section operations
pub trait SectionLookup {
    /// Bundle scope another section writes under
    fn scope_of(&self, section_id: &str) -> Option<BundlePath>;

    /// Run another section's mutation pipeline and return what it wrote under its scope
    fn mutate_scoped(&self, section_id: &str, draft: &Draft, depth: usize) -> Result<Value>;
}

static ABSENT: Value = Value::Null;

#[derive(Clone, Copy)]
pub struct TransformContext<'a> {
    pub config: &'a EngineConfig,
    pub registry: &'a TransformerRegistry,
    pub sections: Option<&'a dyn SectionLookup>,
    /// Whole draft being mutated, or being rebuilt by a query
    pub draft: &'a Draft,
    /// Values of the section the field belongs to
    pub section_values: &'a Value,
    /// Whole bundle, for queries that look outside the section scope
    pub bundle: &'a Value,
    pub section_id: &'a str,
    pub field_name: &'a str,
    /// Discriminator of the nested field being transformed
    pub extra_value: Option<&'a Value>,
    /// Number of cross-section hops that led here
    pub depth: usize,
}

impl<'a> TransformContext<'a> {
    pub fn new(
        config: &'a EngineConfig,
        registry: &'a TransformerRegistry,
        draft: &'a Draft,
        section_id: &'a str,
    ) -> Self {
        Self {
            config,
            registry,
            sections: None,
            draft,
            section_values: draft.section(section_id),
            bundle: &ABSENT,
            section_id,
            field_name: "",
            extra_value: None,
            depth: 0,
        }
    }

    pub fn with_sections(mut self, sections: &'a dyn SectionLookup) -> Self {
        self.sections = Some(sections);
        self
    }

    pub fn with_bundle(mut self, bundle: &'a Value) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn with_section_values(mut self, values: &'a Value) -> Self {
        self.section_values = values;
        self
    }

    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Context narrowed to one field
    pub fn for_field(mut self, name: &'a str, extra_value: Option<&'a Value>) -> Self {
        self.field_name = name;
        self.extra_value = extra_value;
        self
    }

    pub fn is_default_country(&self, country: Option<&str>) -> bool {
        country.map_or(true, |c| c == self.config.default_country)
    }

    /// Value of a sibling field in the same section
    pub fn sibling(&self, name: &str) -> &'a Value {
        self.section_values.get(name).unwrap_or(&ABSENT)
    }

    /// The section lookup, or a configuration error naming the operation that needed it
    pub fn require_sections(&self, operation: &str) -> Result<&'a dyn SectionLookup> {
        self.sections.ok_or_else(|| {
            FormError::configuration(format!(
                "operation '{}' needs access to other sections",
                operation
            ))
            .with_field(self.field_name)
        })
    }

    /// Guard a hop into another section
    pub fn next_depth(&self) -> Result<usize> {
        let next = self.depth + 1;
        if next > self.config.max_section_depth {
            return Err(FormError::transform_with_code(
                ErrorCode::TRANSFORM_RECURSION_LIMIT,
                format!(
                    "cross-section operations nested deeper than {} at '{}'",
                    self.config.max_section_depth, self.field_name
                ),
            ));
        }
        Ok(next)
    }
}

/// Run `write` on the slot at `path` inside `target`
///
/// When nothing ends up in the slot, the keys created to reach it are removed
/// again, so an operation that decides not to write leaves no empty shells.
pub fn within<F>(target: &mut Value, path: &BundlePath, write: F) -> Result<()>
where
    F: FnOnce(&mut Value) -> Result<()>,
{
    if path.is_root() {
        return write(target);
    }

    let target_was_null = target.is_null();
    let segments = path.segments();
    let first_created = (1..=segments.len()).find(|&n| {
        BundlePath::from_segments(segments[..n].to_vec())
            .get(target)
            .map_or(true, Value::is_null)
    });

    let slot = path.get_or_create(target)?;
    let result = write(slot);
    let left_empty = slot.is_null();

    if left_empty {
        if let Some(n) = first_created {
            BundlePath::from_segments(segments[..n].to_vec()).remove(target);
        }
        if target_was_null && target.as_object().is_some_and(|o| o.is_empty()) {
            *target = Value::Null;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_within_writes_into_nested_slot() {
        let mut target = json!({"informant": {"relationship": "MOTHER"}});
        let path = BundlePath::parse("informant.individual").unwrap();
        within(&mut target, &path, |slot| {
            *slot = json!({"name": "Jane"});
            Ok(())
        })
        .unwrap();
        assert_eq!(
            target,
            json!({"informant": {"relationship": "MOTHER", "individual": {"name": "Jane"}}})
        );
    }

    #[test]
    fn test_within_leaves_no_empty_shells() {
        let mut target = Value::Null;
        let path = BundlePath::parse("eventLocation.address").unwrap();
        within(&mut target, &path, |_| Ok(())).unwrap();
        assert_eq!(target, Value::Null);

        let mut target = json!({"eventLocation": {"type": "HOME"}});
        within(&mut target, &path, |_| Ok(())).unwrap();
        assert_eq!(target, json!({"eventLocation": {"type": "HOME"}}));
    }

    #[test]
    fn test_depth_guard() {
        let config = EngineConfig {
            max_section_depth: 1,
            ..EngineConfig::default()
        };
        let registry = TransformerRegistry::new();
        let draft = Draft::new();
        let ctx = TransformContext::new(&config, &registry, &draft, "child");
        assert_eq!(ctx.next_depth().unwrap(), 1);
        let err = ctx.at_depth(1).next_depth().unwrap_err();
        assert_eq!(err.code(), ErrorCode::TRANSFORM_RECURSION_LIMIT);
    }
}
