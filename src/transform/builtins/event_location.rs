//! Where the event happened: a health facility reference or a freeform address
//!
//! A sibling discriminator field (`placeOfBirth`, `deathPlaceAddress`) decides
//! which of the two shapes is written under `eventLocation`.

use super::address::{read_component, write_component};
use super::scalar_text;
use crate::bundle::{is_present, Address, BundlePath};
use crate::error::Result;
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::Value;

/// Discriminator value selecting the facility reference
pub const HEALTH_FACILITY: &str = "HEALTH_FACILITY";

const LOCATION_KEY: &str = "eventLocation";
const FACILITY_ID_KEY: &str = "_fhirID";

fn location_path(key: &str) -> BundlePath {
    BundlePath::root().child(LOCATION_KEY).child(key)
}

fn discriminator<'a>(args: &Args, ctx: &TransformContext<'a>) -> Result<Option<&'a str>> {
    let field = args.str(0)?;
    Ok(ctx.sibling(field).as_str().filter(|s| !s.is_empty()))
}

/// Kind of place, stored as `eventLocation.type`
pub struct EventLocationTypeTransformer;

impl Transformer for EventLocationTypeTransformer {
    fn name(&self) -> &str {
        "eventLocationType"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(0, 0)
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        _args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) {
            return Ok(());
        }
        let text = scalar_text(value, ctx.field_name)?;
        location_path("type").set_in_place(target, Value::String(text))
    }

    fn query(&self, source: &Value, _args: &Args, _ctx: &TransformContext) -> Result<Option<Value>> {
        if let Some(kind) = location_path("type").get(source).filter(|v| is_present(v)) {
            return Ok(Some(kind.clone()));
        }
        // Older records carry only the facility reference
        let has_facility = location_path(FACILITY_ID_KEY)
            .get(source)
            .is_some_and(is_present);
        Ok(has_facility.then(|| Value::String(HEALTH_FACILITY.to_string())))
    }

    fn description(&self) -> &str {
        "Store the kind of place the event happened at"
    }
}

/// Facility id, written only when the discriminator selects a health facility
pub struct EventLocationFacilityTransformer;

impl Transformer for EventLocationFacilityTransformer {
    fn name(&self) -> &str {
        "eventLocationFacility"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(1, 1)?;
        args.str(0).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) || discriminator(args, ctx)? != Some(HEALTH_FACILITY) {
            return Ok(());
        }
        let id = scalar_text(value, ctx.field_name)?;
        location_path(FACILITY_ID_KEY).set_in_place(target, Value::String(id))
    }

    fn query(&self, source: &Value, _args: &Args, _ctx: &TransformContext) -> Result<Option<Value>> {
        Ok(location_path(FACILITY_ID_KEY)
            .get(source)
            .filter(|v| is_present(v))
            .cloned())
    }

    fn description(&self) -> &str {
        "Reference the health facility the event happened at"
    }
}

/// One component of a freeform event address in `eventLocation.address`
///
/// The address is a single record typed by the discriminator value
/// (`PRIVATE_HOME`, `OTHER`), using the same line layout and country branching
/// as person addresses.
pub struct EventLocationAddressTransformer;

impl Transformer for EventLocationAddressTransformer {
    fn name(&self) -> &str {
        "eventLocationAddress"
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
        let kind = match discriminator(args, ctx)? {
            Some(kind) if kind != HEALTH_FACILITY => kind,
            _ => return Ok(()),
        };
        let component = args.address_component(1)?;
        let text = scalar_text(value, ctx.field_name)?;

        let slot = location_path("address").get_or_create(target)?;
        let mut address = if slot.is_null() {
            Address::new(kind)
        } else {
            Address::from_value(slot)?
        };
        write_component(&mut address, component, text, ctx);
        *slot = address.to_value();
        Ok(())
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let component = args.address_component(1)?;
        match location_path("address").get(source) {
            Some(slot) if !slot.is_null() => {
                let address = Address::from_value(slot)?;
                Ok(read_component(&address, component, ctx))
            }
            _ => Ok(None),
        }
    }

    fn description(&self) -> &str {
        "Map a flat field onto the freeform address of the event location"
    }
}
