//! Registry mapping operation names to transformers

use super::args::Args;
use super::builtins;
use super::context::TransformContext;
use crate::error::{helpers::common, ErrorCode, FormError, Result};
use crate::form::Operation;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// One named operation, implemented in both directions
///
/// `mutate` writes a form value into the bundle slot it is handed; `query`
/// reads it back from the bundle scope it is handed. `Ok(None)` from a query
/// means the bundle holds nothing for this field.
pub trait Transformer: Send + Sync {
    fn name(&self) -> &str;

    /// Check static parameters once, when the form is loaded
    fn validate(&self, _args: &Args) -> Result<()> {
        Ok(())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()>;

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>>;

    fn supports_query(&self) -> bool {
        true
    }

    fn description(&self) -> &str {
        ""
    }
}

type MutationFn =
    Arc<dyn Fn(&mut Value, &Value, &Args, &TransformContext) -> Result<()> + Send + Sync>;
type QueryFn = Arc<dyn Fn(&Value, &Args, &TransformContext) -> Result<Option<Value>> + Send + Sync>;

/// Transformer built from closures
struct FnTransformer {
    name: String,
    mutation: MutationFn,
    query: Option<QueryFn>,
}

impl Transformer for FnTransformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        (self.mutation)(target, value, args, ctx)
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        match &self.query {
            Some(query) => query(source, args, ctx),
            None => Err(no_query(&self.name)),
        }
    }

    fn supports_query(&self) -> bool {
        self.query.is_some()
    }
}

fn no_query(name: &str) -> FormError {
    FormError::transform_with_code(
        ErrorCode::TRANSFORM_NO_QUERY,
        format!("operation '{}' has no query direction", name),
    )
}

#[derive(Clone, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("operations", &self.names())
            .finish()
    }
}

impl TransformerRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in operation
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    pub fn register_transformer(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers
            .insert(transformer.name().to_string(), transformer);
    }

    /// Register an operation from a mutation and a query closure
    pub fn register<M, Q>(&mut self, name: impl Into<String>, mutation: M, query: Q)
    where
        M: Fn(&mut Value, &Value, &Args, &TransformContext) -> Result<()> + Send + Sync + 'static,
        Q: Fn(&Value, &Args, &TransformContext) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        let name = name.into();
        self.transformers.insert(
            name.clone(),
            Arc::new(FnTransformer {
                name,
                mutation: Arc::new(mutation),
                query: Some(Arc::new(query)),
            }),
        );
    }

    /// Register an operation that only runs in the mutation direction
    pub fn register_mutation<M>(&mut self, name: impl Into<String>, mutation: M)
    where
        M: Fn(&mut Value, &Value, &Args, &TransformContext) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.transformers.insert(
            name.clone(),
            Arc::new(FnTransformer {
                name,
                mutation: Arc::new(mutation),
                query: None,
            }),
        );
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Transformer>> {
        self.transformers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.transformers.contains_key(name)
    }

    /// Registered operation names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transformers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that an operation tree only uses registered operations with valid parameters
    pub fn validate(&self, operation: &Operation, field: &str) -> Result<()> {
        for op in operation.walk() {
            let transformer = self
                .get(&op.operation)
                .ok_or_else(|| common::unknown_operation(&op.operation, field))?;
            transformer
                .validate(&Args::new(op))
                .map_err(|e| e.with_field(field))?;
        }
        Ok(())
    }

    /// Check that an operation can run in the query direction
    pub fn validate_query(&self, operation: &Operation, field: &str) -> Result<()> {
        self.validate(operation, field)?;
        for op in operation.walk() {
            if let Some(transformer) = self.get(&op.operation) {
                if !transformer.supports_query() {
                    return Err(FormError::configuration_with_code(
                        ErrorCode::CONFIG_UNKNOWN_OPERATION,
                        format!("operation '{}' cannot be used as a query", op.operation),
                    )
                    .with_field(field));
                }
            }
        }
        Ok(())
    }

    /// Apply an operation in the mutation direction
    pub fn mutate(
        &self,
        operation: &Operation,
        target: &mut Value,
        value: &Value,
        ctx: &TransformContext,
    ) -> Result<()> {
        let transformer = self.lookup(operation, ctx)?;
        trace!(
            "mutate {}.{} via {}",
            ctx.section_id,
            ctx.field_name,
            operation.operation
        );
        transformer.mutate(target, value, &Args::new(operation), ctx)
    }

    /// Apply an operation in the query direction
    pub fn query(
        &self,
        operation: &Operation,
        source: &Value,
        ctx: &TransformContext,
    ) -> Result<Option<Value>> {
        let transformer = self.lookup(operation, ctx)?;
        if !transformer.supports_query() {
            return Err(no_query(&operation.operation).with_field(ctx.field_name));
        }
        trace!(
            "query {}.{} via {}",
            ctx.section_id,
            ctx.field_name,
            operation.operation
        );
        transformer.query(source, &Args::new(operation), ctx)
    }

    fn lookup(&self, operation: &Operation, ctx: &TransformContext) -> Result<&Arc<dyn Transformer>> {
        self.get(&operation.operation)
            .ok_or_else(|| common::unknown_operation(&operation.operation, ctx.field_name))
    }
}
