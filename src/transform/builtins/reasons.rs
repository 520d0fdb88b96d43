use crate::bundle::{find_tagged, is_present, upsert_tagged, BundlePath};
use crate::error::{FormError, Result};
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::Value;
use tracing::warn;

/// Shared list every party's reason is written to
pub const REASONS_KEY: &str = "reasonsNotApplying";
/// Tag distinguishing the records of [`REASONS_KEY`]
pub const CAREGIVER_TYPE_KEY: &str = "primaryCaregiverType";

/// One property of a party's "reason not applying" record
///
/// Used by the nested fields of a caregiver radio group: every option writes
/// into the same `reasonsNotApplying` list, in the record tagged with the
/// option's `extraValue`.
pub struct ReasonNotApplyingTransformer;

impl ReasonNotApplyingTransformer {
    fn tag<'a>(ctx: &TransformContext<'a>) -> Result<&'a Value> {
        ctx.extra_value.ok_or_else(|| {
            FormError::mismatch(format!(
                "'{}' is only valid on a nested field with an extraValue",
                REASONS_KEY
            ))
            .with_field(ctx.field_name)
        })
    }
}

impl Transformer for ReasonNotApplyingTransformer {
    fn name(&self) -> &str {
        "reasonNotApplying"
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
        if !is_present(value) {
            return Ok(());
        }
        let property = args.str(0)?;
        let tag = Self::tag(ctx)?;
        let list = BundlePath::root().child(REASONS_KEY).get_or_create(target)?;
        let record = upsert_tagged(list, CAREGIVER_TYPE_KEY, tag)?;
        record.insert(property.to_string(), value.clone());
        Ok(())
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let property = args.str(0)?;
        let tag = Self::tag(ctx)?;
        let Some(list) = source.get(REASONS_KEY) else {
            return Ok(None);
        };
        let records = find_tagged(list, CAREGIVER_TYPE_KEY, tag)?;
        if records.len() > 1 {
            warn!(
                "{} reasonsNotApplying records tagged {}, using the first for '{}'",
                records.len(),
                tag,
                ctx.field_name
            );
        }
        Ok(records
            .first()
            .and_then(|record| record.get(property))
            .filter(|v| is_present(v))
            .cloned())
    }

    fn description(&self) -> &str {
        "Record why a party is not the primary caregiver, tagged by party"
    }
}
