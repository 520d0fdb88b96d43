use super::scalar_text;
use crate::bundle::{find_address, is_present, upsert_address, Address, AddressComponent, BundlePath};
use crate::error::Result;
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::Value;
use tracing::debug;

/// Write one component into an address, keeping state/district on the side
/// (local or international) that matches the address country
pub(super) fn write_component(
    address: &mut Address,
    component: AddressComponent,
    text: String,
    ctx: &TransformContext,
) {
    match component {
        AddressComponent::Country => {
            let is_default = ctx.is_default_country(Some(text.as_str()));
            address.set(AddressComponent::Country, text);
            address.reroute(is_default);
        }
        other => {
            let is_default = ctx.is_default_country(address.country.as_deref());
            address.set(other.route(is_default), text);
        }
    }
}

/// Whether the local state/district keys are the readable side
///
/// Without a country the populated side wins, so an address stored with only
/// international keys still reads back.
fn reads_local_side(address: &Address, ctx: &TransformContext) -> bool {
    if address.country.is_some() {
        return ctx.is_default_country(address.country.as_deref());
    }
    let has = |component| address.get(component).is_some();
    let local = has(AddressComponent::State) || has(AddressComponent::District);
    let international =
        has(AddressComponent::InternationalState) || has(AddressComponent::InternationalDistrict);
    if international && !local {
        debug!(
            "{} address has no country, reading its international keys",
            address.address_type.as_deref().unwrap_or("untyped")
        );
        return false;
    }
    true
}

/// Read one component, honouring which side the address country selects
pub(super) fn read_component(
    address: &Address,
    component: AddressComponent,
    ctx: &TransformContext,
) -> Option<Value> {
    let is_default = reads_local_side(address, ctx);
    if !component.readable_for(is_default) {
        return None;
    }
    address
        .get(component)
        .map(|text| Value::String(text.to_string()))
}

/// One line or key of a typed address in the `address` list
///
/// `address("PERMANENT", 6)` is the chief line of the permanent address;
/// `address("CURRENT", "district")` its district, stored as
/// `internationalDistrict` when the country is not the default one.
pub struct AddressTransformer;

impl Transformer for AddressTransformer {
    fn name(&self) -> &str {
        "address"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(2, 2)?;
        args.str(0)?;
        args.address_component(1).map(|_| ())
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
        let address_type = args.str(0)?;
        let component = args.address_component(1)?;
        let text = scalar_text(value, ctx.field_name)?;

        let slot = BundlePath::root().child("address").get_or_create(target)?;
        upsert_address(slot, address_type, |address| {
            write_component(address, component, text, ctx)
        })
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let address_type = args.str(0)?;
        let component = args.address_component(1)?;
        let Some(list) = source.get("address") else {
            return Ok(None);
        };
        Ok(find_address(list, address_type)?
            .and_then(|address| read_component(&address, component, ctx)))
    }

    fn description(&self) -> &str {
        "Map a flat field onto a positional line or key of a typed address"
    }
}
