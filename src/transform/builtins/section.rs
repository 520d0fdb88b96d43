use crate::bundle::{is_present, BundlePath};
use crate::error::{FormError, Result};
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::{json, Map, Value};

/// Draft keys the registration section carries over from the record
const CARRIED_KEYS: [&str; 2] = ["trackingId", "registrationNumber"];

/// Final reshape of the registration section
///
/// Runs once per section with the collected section values and writes into the
/// whole bundle: the event type, a `DRAFT` status when none is set yet, and the
/// tracking and registration numbers when the draft already holds them. The
/// query direction exposes those two numbers as draft values again.
pub struct RegistrationSectionTransformer;

impl Transformer for RegistrationSectionTransformer {
    fn name(&self) -> &str {
        "registrationSection"
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
        let event_type = args.str(0)?.to_uppercase();
        let registration = BundlePath::root().child("registration");
        let slot = registration.get_or_create(target)?;
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        let record = slot.as_object_mut().ok_or_else(|| {
            FormError::mismatch("registration must be an object").with_field(ctx.section_id)
        })?;

        record.insert("type".to_string(), Value::String(event_type));
        if !record.get("status").is_some_and(is_present) {
            record.insert("status".to_string(), json!([{"type": "DRAFT"}]));
        }
        for key in CARRIED_KEYS {
            if let Some(carried) = value.get(key).filter(|v| is_present(v)) {
                record.insert(key.to_string(), carried.clone());
            }
        }
        Ok(())
    }

    fn query(&self, source: &Value, _args: &Args, _ctx: &TransformContext) -> Result<Option<Value>> {
        let Some(record) = source.get("registration") else {
            return Ok(None);
        };
        let carried: Map<String, Value> = CARRIED_KEYS
            .iter()
            .filter_map(|key| {
                record
                    .get(*key)
                    .filter(|v| is_present(v))
                    .map(|v| (key.to_string(), v.clone()))
            })
            .collect();
        Ok((!carried.is_empty()).then_some(Value::Object(carried)))
    }

    fn description(&self) -> &str {
        "Stamp event type and status onto the registration record"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::builtins::test_support::{op, Harness};

    fn section_op() -> crate::form::Operation {
        op(json!({"operation": "registrationSection", "parameters": ["birth"]}))
    }

    #[test]
    fn test_sets_type_and_default_status() {
        let h = Harness::new(json!({}));
        let mut bundle = json!({"registration": {"contactPhoneNumber": "+260"}});
        h.registry
            .mutate(&section_op(), &mut bundle, &json!({}), &h.ctx("registration", ""))
            .unwrap();
        assert_eq!(
            bundle,
            json!({"registration": {
                "contactPhoneNumber": "+260",
                "type": "BIRTH",
                "status": [{"type": "DRAFT"}]
            }})
        );
    }

    #[test]
    fn test_existing_status_is_kept_and_numbers_round_trip() {
        let h = Harness::new(json!({}));
        let mut bundle = json!({"registration": {"status": [{"type": "REGISTERED"}]}});
        let values = json!({"trackingId": "B123456", "registrationNumber": ""});
        h.registry
            .mutate(&section_op(), &mut bundle, &values, &h.ctx("registration", ""))
            .unwrap();
        assert_eq!(bundle["registration"]["status"], json!([{"type": "REGISTERED"}]));
        assert_eq!(bundle["registration"]["trackingId"], json!("B123456"));
        assert!(bundle["registration"].get("registrationNumber").is_none());

        assert_eq!(
            h.query(&section_op(), "", &bundle),
            Some(json!({"trackingId": "B123456"}))
        );
        assert_eq!(h.query(&section_op(), "", &json!({"registration": {}})), None);
    }
}
