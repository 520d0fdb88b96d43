//! Load-time checks of a form definition
//!
//! Everything that would otherwise fail mid-edit is caught here: unknown
//! operations, bad operation parameters, explicit query mappings without a
//! query direction, bad section scopes and, in strict mode, malformed conditionals.
//! All problems are collected so one run reports every one of them.

use super::field::{Conditional, FieldDefinition};
use super::section::{FormDefinition, Section};
use crate::config::ExpressionMode;
use crate::error::{ErrorCode, FormError, Result};
use crate::expression::ExpressionEngine;
use crate::transform::TransformerRegistry;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<String>,
    pub sections: usize,
    pub fields: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// One configuration error listing every issue
    pub fn into_result(self) -> Result<Self> {
        if self.is_valid() {
            return Ok(self);
        }
        Err(FormError::configuration_with_code(
            ErrorCode::CONFIG_VALIDATION_FAILED,
            format!(
                "form definition has {} problem(s):\n  - {}",
                self.issues.len(),
                self.issues.join("\n  - ")
            ),
        ))
    }
}

pub struct FormValidator<'a> {
    registry: &'a TransformerRegistry,
    expressions: &'a ExpressionEngine,
}

impl<'a> FormValidator<'a> {
    pub fn new(registry: &'a TransformerRegistry, expressions: &'a ExpressionEngine) -> Self {
        Self {
            registry,
            expressions,
        }
    }

    pub fn validate(&self, form: &FormDefinition) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut section_ids = HashSet::new();

        for section in &form.sections {
            report.sections += 1;
            if !section_ids.insert(section.id.as_str()) {
                report
                    .issues
                    .push(format!("section '{}' is declared twice", section.id));
            }
            self.validate_section(section, &mut report);
        }
        report
    }

    fn validate_section(&self, section: &Section, report: &mut ValidationReport) {
        if let Err(e) = section.scope_path() {
            report
                .issues
                .push(format!("section '{}': bad scope: {}", section.id, e));
        }

        if let Some(mapping) = &section.mapping {
            let label = format!("{} (section)", section.id);
            if let Some(op) = &mapping.mutation {
                self.check(self.registry.validate(op, &label), &section.id, report);
            }
            if let Some(op) = &mapping.query {
                self.check(self.registry.validate_query(op, &label), &section.id, report);
            }
        }

        let mut names = HashSet::new();
        for group in &section.groups {
            self.validate_conditionals(&group.conditionals, &section.id, &group.id, report);
            for field in &group.fields {
                report.fields += 1;
                if !names.insert(field.name.as_str()) {
                    report.issues.push(format!(
                        "section '{}': field '{}' is declared twice",
                        section.id, field.name
                    ));
                }
                self.validate_field(field, &section.id, report);
            }
        }
    }

    fn validate_field(&self, field: &FieldDefinition, section_id: &str, report: &mut ValidationReport) {
        if let Some(mapping) = &field.mapping {
            if let Some(op) = &mapping.mutation {
                self.check(self.registry.validate(op, &field.name), section_id, report);
            }
            // An implicit query reuses the mutation, already checked above
            if let Some(op) = &mapping.query {
                self.check(
                    self.registry.validate_query(op, &field.name),
                    section_id,
                    report,
                );
            }
        }
        self.validate_conditionals(&field.conditionals, section_id, &field.name, report);

        if !field.nested_fields.is_empty() && !field.has_nested_fields() {
            report.issues.push(format!(
                "section '{}': field '{}' declares nestedFields but is {}",
                section_id, field.name, field.field_type
            ));
        }
        for nested in field.nested_fields.values().flatten() {
            self.validate_field(nested, section_id, report);
        }
    }

    fn validate_conditionals(
        &self,
        conditionals: &[Conditional],
        section_id: &str,
        owner: &str,
        report: &mut ValidationReport,
    ) {
        if self.expressions.mode() != ExpressionMode::Strict {
            return;
        }
        for conditional in conditionals {
            if let Err(e) = self.expressions.parse(&conditional.expression) {
                report.issues.push(format!(
                    "section '{}': conditional on '{}': {}",
                    section_id, owner, e
                ));
            }
        }
    }

    fn check(&self, result: Result<()>, section_id: &str, report: &mut ValidationReport) {
        if let Err(e) = result {
            let issue = match e.field() {
                Some(field) => format!("section '{}': field '{}': {}", section_id, field, e),
                None => format!("section '{}': {}", section_id, e),
            };
            report.issues.push(issue);
        }
    }
}
