//! Helper predicates callable from conditional expressions

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::evaluator::is_truthy;

/// A helper receives its evaluated arguments and returns a value
pub type HelperFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Clone, Default)]
pub struct HelperRegistry {
    helpers: HashMap<String, HelperFn>,
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.helpers.keys().collect();
        names.sort();
        f.debug_struct("HelperRegistry").field("helpers", &names).finish()
    }
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in helpers bound to the given default country
    pub fn with_defaults(default_country: &str) -> Self {
        let mut registry = Self::new();

        let country = default_country.to_string();
        registry.register("isDefaultCountry", move |args| {
            Value::Bool(args.first().and_then(Value::as_str) == Some(country.as_str()))
        });

        registry.register("includes", |args| {
            let found = match (args.first(), args.get(1)) {
                (Some(Value::Array(items)), Some(needle)) => items.contains(needle),
                (Some(Value::String(haystack)), Some(Value::String(needle))) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            };
            Value::Bool(found)
        });

        registry.register("isEmpty", |args| {
            Value::Bool(args.first().map_or(true, |v| match v {
                Value::Array(a) => a.is_empty(),
                Value::Object(o) => o.is_empty(),
                other => !is_truthy(other),
            }))
        });

        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, helper: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.helpers.insert(name.into(), Arc::new(helper));
    }

    pub fn get(&self, name: &str) -> Option<&HelperFn> {
        self.helpers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_default_country() {
        let helpers = HelperRegistry::with_defaults("FAR");
        let f = helpers.get("isDefaultCountry").unwrap();
        assert_eq!(f(&[json!("FAR")]), json!(true));
        assert_eq!(f(&[json!("XYZ")]), json!(false));
        assert_eq!(f(&[]), json!(false));
    }

    #[test]
    fn test_includes() {
        let helpers = HelperRegistry::with_defaults("FAR");
        let f = helpers.get("includes").unwrap();
        assert_eq!(f(&[json!(["A", "B"]), json!("B")]), json!(true));
        assert_eq!(f(&[json!("MOTHER_AND_FATHER"), json!("FATHER")]), json!(true));
        assert_eq!(f(&[Value::Null, json!("B")]), json!(false));
    }

    #[test]
    fn test_is_empty() {
        let helpers = HelperRegistry::with_defaults("FAR");
        let f = helpers.get("isEmpty").unwrap();
        assert_eq!(f(&[json!("")]), json!(true));
        assert_eq!(f(&[json!([])]), json!(true));
        assert_eq!(f(&[json!("x")]), json!(false));
        assert_eq!(f(&[]), json!(true));
    }
}
