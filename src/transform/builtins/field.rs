use crate::bundle::{is_present, BundlePath};
use crate::error::Result;
use crate::transform::args::Args;
use crate::transform::context::{within, TransformContext};
use crate::transform::registry::Transformer;
use serde_json::Value;

/// Bundle path given as parameter `index`, or the field's own name
fn path_or_field(args: &Args, index: usize, ctx: &TransformContext) -> Result<BundlePath> {
    Ok(args
        .path(index)?
        .unwrap_or_else(|| BundlePath::root().child(ctx.field_name)))
}

/// Copy the value to a path (default: the field name)
pub struct FieldNameTransformer;

impl Transformer for FieldNameTransformer {
    fn name(&self) -> &str {
        "fieldName"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(0, 1)?;
        args.path(0).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) {
            return Ok(());
        }
        path_or_field(args, 0, ctx)?.set_in_place(target, value.clone())
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let path = path_or_field(args, 0, ctx)?;
        Ok(path.get(source).filter(|v| is_present(v)).cloned())
    }

    fn description(&self) -> &str {
        "Write the value at a bundle path, read it back from the same path"
    }
}

/// Run an inner operation inside a sub-object of the bundle
///
/// `nest("informant", fieldName("relationship"))` writes
/// `{ informant: { relationship: <value> } }`. Without an inner operation the
/// value is written under the field name.
pub struct NestTransformer;

impl Transformer for NestTransformer {
    fn name(&self) -> &str {
        "nest"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(1, 2)?;
        args.path(0)?;
        args.opt_nested(1).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) {
            return Ok(());
        }
        let scope = args.path(0)?.unwrap_or_default();
        let inner = args.opt_nested(1)?;
        within(target, &scope, |slot| match inner {
            Some(op) => ctx.registry.mutate(op, slot, value, ctx),
            None => BundlePath::root()
                .child(ctx.field_name)
                .set_in_place(slot, value.clone()),
        })
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let scope = args.path(0)?.unwrap_or_default();
        let Some(scoped) = scope.get(source) else {
            return Ok(None);
        };
        match args.opt_nested(1)? {
            Some(op) => ctx.registry.query(op, scoped, ctx),
            None => Ok(scoped
                .get(ctx.field_name)
                .filter(|v| is_present(v))
                .cloned()),
        }
    }

    fn description(&self) -> &str {
        "Narrow the bundle to a sub-object and apply an inner operation there"
    }
}

/// Wrap a scalar in a one-element list, unwrap on query
pub struct ArrayWrapTransformer;

impl Transformer for ArrayWrapTransformer {
    fn name(&self) -> &str {
        "arrayWrap"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(0, 1)?;
        args.path(0).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) {
            return Ok(());
        }
        let wrapped = match value {
            Value::Array(_) => value.clone(),
            scalar => Value::Array(vec![scalar.clone()]),
        };
        path_or_field(args, 0, ctx)?.set_in_place(target, wrapped)
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let path = path_or_field(args, 0, ctx)?;
        Ok(match path.get(source) {
            Some(Value::Array(items)) => items.first().filter(|v| is_present(v)).cloned(),
            Some(scalar) if is_present(scalar) => Some(scalar.clone()),
            _ => None,
        })
    }

    fn description(&self) -> &str {
        "Store a single value as a one-element list"
    }
}
