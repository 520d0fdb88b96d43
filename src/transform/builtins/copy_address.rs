use super::is_checked;
use crate::bundle::{find_address, upsert_address, Address, BundlePath};
use crate::error::Result;
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::Value;
use tracing::debug;

/// Mirror one address onto another behind a "same as" checkbox
///
/// `copyAddress("PERMANENT", "CURRENT")` copies the permanent address already
/// written earlier in the same section. With a third parameter the source
/// address is taken from another section, e.g. the mother's permanent address
/// for `copyAddress("PERMANENT", "PERMANENT", "mother")` in the father section.
///
/// On query the checkbox is derived from whether both addresses describe the
/// same place.
pub struct CopyAddressTransformer;

impl CopyAddressTransformer {
    fn source_address(
        &self,
        target: &Value,
        from_type: &str,
        from_section: Option<&str>,
        ctx: &TransformContext,
    ) -> Result<Option<Address>> {
        match from_section {
            None => match target.get("address") {
                Some(list) => find_address(list, from_type),
                None => Ok(None),
            },
            Some(section) => {
                let sections = ctx.require_sections(self.name())?;
                let depth = ctx.next_depth()?;
                let scoped = sections.mutate_scoped(section, ctx.draft, depth)?;
                match scoped.get("address") {
                    Some(list) => find_address(list, from_type),
                    None => Ok(None),
                }
            }
        }
    }
}

impl Transformer for CopyAddressTransformer {
    fn name(&self) -> &str {
        "copyAddress"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(2, 3)?;
        args.str(0)?;
        args.str(1)?;
        args.opt_str(2).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_checked(value) {
            return Ok(());
        }
        let from_type = args.str(0)?;
        let to_type = args.str(1)?;
        let from_section = args.opt_str(2)?;

        let Some(from) = self.source_address(target, from_type, from_section, ctx)? else {
            debug!(
                "{}: no {} address to copy into {}",
                ctx.field_name, from_type, to_type
            );
            return Ok(());
        };
        let copy = from.retyped(to_type);
        let slot = BundlePath::root().child("address").get_or_create(target)?;
        upsert_address(slot, to_type, |address| *address = copy)
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let from_type = args.str(0)?;
        let to_type = args.str(1)?;

        let from_scope = match args.opt_str(2)? {
            None => Some(source),
            Some(section) => {
                let sections = ctx.require_sections(self.name())?;
                sections
                    .scope_of(section)
                    .and_then(|scope| scope.get(ctx.bundle))
            }
        };
        let from = match from_scope.and_then(|scope| scope.get("address")) {
            Some(list) => find_address(list, from_type)?,
            None => None,
        };
        let to = match source.get("address") {
            Some(list) => find_address(list, to_type)?,
            None => None,
        };

        Ok(match (from, to) {
            (Some(from), Some(to)) => Some(Value::Bool(from.same_location(&to))),
            _ => None,
        })
    }

    fn description(&self) -> &str {
        "Copy one address onto another when a checkbox is ticked"
    }
}
