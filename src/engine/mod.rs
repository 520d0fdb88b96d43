//! The form engine: visibility, mutation and query over one form definition
//!
//! ```
//! use regform::{Draft, EngineConfig, FormDefinition, FormEngine};
//! use serde_json::json;
//!
//! let form = FormDefinition::from_json_str(r#"{
//!   "event": "birth",
//!   "sections": [{
//!     "id": "registration",
//!     "groups": [{
//!       "id": "contact",
//!       "fields": [{
//!         "name": "contactPhoneNumber",
//!         "type": "TEL",
//!         "mapping": {"mutation": {"operation": "fieldName",
//!                                  "parameters": ["registration.contactPhoneNumber"]}}
//!       }]
//!     }]
//!   }]
//! }"#).unwrap();
//! let engine = FormEngine::new(form, EngineConfig::default()).unwrap();
//!
//! let draft = Draft::from_value(json!({"registration": {"contactPhoneNumber": "+260"}})).unwrap();
//! let outcome = engine.mutate_section("registration", &draft).unwrap();
//! assert_eq!(outcome.fragment, json!({"registration": {"contactPhoneNumber": "+260"}}));
//!
//! let back = engine.query_section("registration", &outcome.fragment).unwrap();
//! assert_eq!(back.values, json!({"contactPhoneNumber": "+260"}));
//! ```

pub mod draft;
pub mod mutation;
pub mod nested;
pub mod query;
pub mod visibility;

pub use draft::Draft;
pub use mutation::{FieldFailure, MutationOutcome, MutationPipeline};
pub use nested::Selection;
pub use query::{QueryOutcome, QueryPipeline};
pub use visibility::{ConditionCache, FieldState, VisibilityResolver};

use crate::bundle::BundlePath;
use crate::config::EngineConfig;
use crate::error::{helpers::common, Result};
use crate::expression::ExpressionEngine;
use crate::form::{FormDefinition, FormValidator, Section, ValidationReport};
use crate::transform::{SectionLookup, TransformerRegistry};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A validated form definition ready to transform drafts and bundles
///
/// Holds no state between calls; every method is a function of its arguments,
/// so one engine can serve any number of sections concurrently.
#[derive(Debug)]
pub struct FormEngine {
    form: FormDefinition,
    config: EngineConfig,
    registry: TransformerRegistry,
    expressions: ExpressionEngine,
    conditions: ConditionCache,
    scopes: HashMap<String, BundlePath>,
    report: ValidationReport,
}

impl FormEngine {
    /// Build an engine with the built-in operations
    pub fn new(form: FormDefinition, config: EngineConfig) -> Result<Self> {
        Self::with_registry(form, config, TransformerRegistry::with_builtins())
    }

    /// Build an engine with a custom operation registry
    ///
    /// Fails with a single configuration error listing every problem of the
    /// form definition.
    pub fn with_registry(
        form: FormDefinition,
        config: EngineConfig,
        registry: TransformerRegistry,
    ) -> Result<Self> {
        let expressions = ExpressionEngine::new(&config);
        let report = FormValidator::new(&registry, &expressions)
            .validate(&form)
            .into_result()?;
        let conditions = ConditionCache::compile(&form, &expressions)?;

        let mut scopes = HashMap::new();
        for section in &form.sections {
            scopes.insert(section.id.clone(), section.scope_path()?);
        }

        info!(
            "Form '{}' ready: {} sections, {} fields, {} conditionals",
            form.event,
            report.sections,
            report.fields,
            conditions.len()
        );
        Ok(Self {
            form,
            config,
            registry,
            expressions,
            conditions,
            scopes,
            report,
        })
    }

    pub fn form(&self) -> &FormDefinition {
        &self.form
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// What load-time validation counted
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    fn section(&self, id: &str) -> Result<&Section> {
        self.form.section(id).ok_or_else(|| common::unknown_section(id))
    }

    fn visibility(&self) -> VisibilityResolver<'_> {
        VisibilityResolver::new(&self.expressions, &self.conditions)
    }

    /// Visibility, requiredness and disabled state of every field of a section
    pub fn get_visible_fields(&self, section_id: &str, draft: &Draft) -> Result<Vec<FieldState>> {
        let section = self.section(section_id)?;
        Ok(self.visibility().section_states(section, draft))
    }

    /// Convert one section of the draft into a bundle fragment
    ///
    /// Only an unknown section id is an error; failing fields are listed in
    /// the outcome and left out of the fragment.
    pub fn mutate_section(&self, section_id: &str, draft: &Draft) -> Result<MutationOutcome> {
        self.mutate_at(section_id, draft, 0)
    }

    fn mutate_at(&self, section_id: &str, draft: &Draft, depth: usize) -> Result<MutationOutcome> {
        let section = self.section(section_id)?;
        let pipeline = MutationPipeline {
            config: &self.config,
            registry: &self.registry,
            visibility: self.visibility(),
            sections: self,
        };
        pipeline.run(section, draft, depth)
    }

    /// Mutate every section in declaration order and merge the fragments
    pub fn mutate_form(&self, draft: &Draft) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();
        for section in &self.form.sections {
            match self.mutate_section(&section.id, draft) {
                Ok(section_outcome) => outcome.absorb(section_outcome),
                Err(e) => warn!("Section '{}' skipped: {}", section.id, e),
            }
        }
        outcome
    }

    /// Read one section's flat draft values back out of a bundle
    pub fn query_section(&self, section_id: &str, bundle: &Value) -> Result<QueryOutcome> {
        let section = self.section(section_id)?;
        let pipeline = QueryPipeline {
            config: &self.config,
            registry: &self.registry,
            sections: self,
        };
        pipeline.run(section, bundle)
    }

    /// Rebuild the whole draft from a bundle
    pub fn query_form(&self, bundle: &Value) -> Draft {
        let mut draft = Draft::new();
        for section in &self.form.sections {
            match self.query_section(&section.id, bundle) {
                Ok(outcome) => draft.set_section(section.id.clone(), outcome.values),
                Err(e) => warn!("Section '{}' skipped: {}", section.id, e),
            }
        }
        draft
    }

    /// Evaluate expression text outside of any field
    ///
    /// Malformed expressions evaluate to `false` in either mode.
    pub fn evaluate_conditional(&self, expression: &str, draft: &Draft, values: &Value) -> bool {
        match self.expressions.evaluate_str(expression, draft.as_value(), values) {
            Ok(result) => result,
            Err(e) => {
                warn!("Conditional '{}' evaluated as false: {}", expression, e);
                false
            }
        }
    }
}

impl SectionLookup for FormEngine {
    fn scope_of(&self, section_id: &str) -> Option<BundlePath> {
        self.scopes.get(section_id).cloned()
    }

    fn mutate_scoped(&self, section_id: &str, draft: &Draft, depth: usize) -> Result<Value> {
        let outcome = self.mutate_at(section_id, draft, depth)?;
        if !outcome.is_complete() {
            debug!(
                "{} field(s) of '{}' failed while read by another section",
                outcome.failures.len(),
                section_id
            );
        }
        let scope = self.scope_of(section_id).unwrap_or_default();
        Ok(scope.get(&outcome.fragment).cloned().unwrap_or(Value::Null))
    }
}
