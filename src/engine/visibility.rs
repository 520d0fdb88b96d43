//! Which fields are shown, required and editable under the current draft

use super::draft::Draft;
use super::nested;
use crate::expression::{CompiledCondition, EvaluationContext, ExpressionEngine};
use crate::error::Result;
use crate::form::{Conditional, ConditionalAction, FieldDefinition, FormDefinition, Group, Section};
use serde::Serialize;
use std::collections::HashMap;

/// Conditionals of a form compiled once, keyed by their source text
#[derive(Debug, Clone, Default)]
pub struct ConditionCache {
    compiled: HashMap<String, CompiledCondition>,
}

impl ConditionCache {
    /// Compile every group, field and nested field conditional of the form
    pub fn compile(form: &FormDefinition, expressions: &ExpressionEngine) -> Result<Self> {
        let mut cache = Self::default();
        for section in &form.sections {
            for group in &section.groups {
                cache.add_all(&group.conditionals, expressions)?;
                for field in &group.fields {
                    cache.add_field(field, expressions)?;
                }
            }
        }
        Ok(cache)
    }

    fn add_field(&mut self, field: &FieldDefinition, expressions: &ExpressionEngine) -> Result<()> {
        self.add_all(&field.conditionals, expressions)?;
        for nested in field.nested_fields.values().flatten() {
            self.add_field(nested, expressions)?;
        }
        Ok(())
    }

    fn add_all(&mut self, conditionals: &[Conditional], expressions: &ExpressionEngine) -> Result<()> {
        for conditional in conditionals {
            if !self.compiled.contains_key(&conditional.expression) {
                let compiled = expressions.compile(&conditional.expression)?;
                self.compiled.insert(conditional.expression.clone(), compiled);
            }
        }
        Ok(())
    }

    pub fn get(&self, source: &str) -> Option<&CompiledCondition> {
        self.compiled.get(source)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Effective state of one field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    pub name: String,
    pub visible: bool,
    pub required: bool,
    pub disabled: bool,
    /// Selected option of a radio group with nested fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_option: Option<String>,
    /// States of the nested fields the active option reveals
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested: Vec<FieldState>,
}

pub struct VisibilityResolver<'a> {
    expressions: &'a ExpressionEngine,
    conditions: &'a ConditionCache,
}

impl<'a> VisibilityResolver<'a> {
    pub fn new(expressions: &'a ExpressionEngine, conditions: &'a ConditionCache) -> Self {
        Self {
            expressions,
            conditions,
        }
    }

    fn holds(&self, conditional: &Conditional, context: &EvaluationContext) -> bool {
        match self.conditions.get(&conditional.expression) {
            Some(compiled) => self.expressions.evaluate(compiled, context),
            // Not part of the compiled form, e.g. a field built in code
            None => match self.expressions.compile(&conditional.expression) {
                Ok(compiled) => self.expressions.evaluate(&compiled, context),
                Err(_) => false,
            },
        }
    }

    fn any(&self, conditionals: &[Conditional], action: ConditionalAction, context: &EvaluationContext) -> bool {
        conditionals
            .iter()
            .filter(|c| c.action == action)
            .any(|c| self.holds(c, context))
    }

    /// Hidden when any hide conditional holds
    pub fn is_hidden(&self, conditionals: &[Conditional], context: &EvaluationContext) -> bool {
        self.any(conditionals, ConditionalAction::Hide, context)
    }

    /// Disabled when any disable conditional holds, or when enable conditionals
    /// exist and none of them holds
    pub fn is_disabled(&self, conditionals: &[Conditional], context: &EvaluationContext) -> bool {
        if self.any(conditionals, ConditionalAction::Disable, context) {
            return true;
        }
        let has_enable = conditionals
            .iter()
            .any(|c| c.action == ConditionalAction::Enable);
        has_enable && !self.any(conditionals, ConditionalAction::Enable, context)
    }

    pub fn group_visible(&self, group: &Group, context: &EvaluationContext) -> bool {
        !self.is_hidden(&group.conditionals, context)
    }

    pub fn field_visible(&self, field: &FieldDefinition, context: &EvaluationContext) -> bool {
        !self.is_hidden(&field.conditionals, context)
    }

    pub fn field_state(
        &self,
        field: &FieldDefinition,
        group_visible: bool,
        value: &serde_json::Value,
        context: &EvaluationContext,
    ) -> FieldState {
        let visible = group_visible && self.field_visible(field, context);
        let disabled = self.is_disabled(&field.conditionals, context);

        let mut active_option = None;
        let mut nested_states = Vec::new();
        if field.has_nested_fields() {
            if let Some(selection) = nested::Selection::of(value) {
                for child in field.nested_for(&selection.option) {
                    let child_value = selection.nested_value(&child.name);
                    nested_states.push(self.field_state(child, visible, child_value, context));
                }
                active_option = Some(selection.option);
            }
        }

        FieldState {
            name: field.name.clone(),
            visible,
            required: field.required && visible && !disabled,
            disabled,
            active_option,
            nested: nested_states,
        }
    }

    /// Every field of a section in declaration order
    pub fn section_states(&self, section: &Section, draft: &Draft) -> Vec<FieldState> {
        let values = draft.section(&section.id);
        let context = EvaluationContext::new(draft.as_value(), values);
        let mut states = Vec::new();
        for group in &section.groups {
            let group_visible = self.group_visible(group, &context);
            for field in &group.fields {
                let value = values.get(&field.name).unwrap_or(&serde_json::Value::Null);
                states.push(self.field_state(field, group_visible, value, &context));
            }
        }
        states
    }
}
