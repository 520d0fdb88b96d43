//! Common test utilities and helpers

#![allow(dead_code)]

use regform::{Draft, EngineConfig, FormDefinition, FormEngine, FieldState};
use serde_json::Value;
use std::path::PathBuf;

/// Path of a file under `tests/fixtures`
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The birth registration form every integration test runs against
pub fn birth_form() -> FormDefinition {
    FormDefinition::from_path(&fixture_path("birth_form.json")).expect("birth form fixture loads")
}

/// Engine over the birth form with the default configuration (country `FAR`)
pub fn birth_engine() -> FormEngine {
    birth_engine_with(EngineConfig::default())
}

pub fn birth_engine_with(config: EngineConfig) -> FormEngine {
    FormEngine::new(birth_form(), config).expect("birth form fixture is valid")
}

pub fn draft(value: Value) -> Draft {
    Draft::from_value(value).expect("draft is an object")
}

/// State of one field by name, searching nested fields too
pub fn state<'a>(states: &'a [FieldState], name: &str) -> &'a FieldState {
    fn find<'a>(states: &'a [FieldState], name: &str) -> Option<&'a FieldState> {
        states.iter().find_map(|s| {
            if s.name == name {
                Some(s)
            } else {
                find(&s.nested, name)
            }
        })
    }
    find(states, name).unwrap_or_else(|| panic!("no field state named '{}'", name))
}

/// The address of a given type in a scoped bundle fragment
pub fn address<'a>(scoped: &'a Value, address_type: &str) -> &'a Value {
    scoped["address"]
        .as_array()
        .and_then(|list| list.iter().find(|a| a["type"] == address_type))
        .unwrap_or_else(|| panic!("no {} address in {}", address_type, scoped))
}
