use crate::bundle::{find_tagged, is_present, upsert_tagged, BundlePath};
use crate::error::Result;
use crate::transform::args::Args;
use crate::transform::context::TransformContext;
use crate::transform::registry::Transformer;
use serde_json::Value;
use tracing::warn;

fn write_tagged(
    target: &mut Value,
    list_key: &str,
    tag_key: &str,
    tag: &str,
    property: &str,
    value: &Value,
) -> Result<()> {
    let list = BundlePath::root().child(list_key).get_or_create(target)?;
    let record = upsert_tagged(list, tag_key, &Value::String(tag.to_string()))?;
    record.insert(property.to_string(), value.clone());
    Ok(())
}

fn read_tagged(
    source: &Value,
    list_key: &str,
    tag_key: &str,
    tag: &str,
    property: &str,
) -> Result<Option<Value>> {
    let Some(list) = source.get(list_key) else {
        return Ok(None);
    };
    let records = find_tagged(list, tag_key, &Value::String(tag.to_string()))?;
    if records.len() > 1 {
        warn!(
            "{} '{}' records share {} '{}', using the first",
            records.len(),
            list_key,
            tag_key,
            tag
        );
    }
    Ok(records
        .first()
        .and_then(|record| record.get(property))
        .filter(|v| is_present(v))
        .cloned())
}

/// One part of a person's name in the language-tagged `name` list
///
/// `name("en", "firstNames")` writes `{ name: [{ use: "en", firstNames: .. }] }`.
/// With a single parameter the configured default language is used.
pub struct NameTransformer;

impl NameTransformer {
    fn lang_and_part<'a>(args: &Args<'a>, ctx: &'a TransformContext) -> Result<(&'a str, &'a str)> {
        if args.len() == 1 {
            Ok((ctx.config.language.as_str(), args.str(0)?))
        } else {
            Ok((args.str(0)?, args.str(1)?))
        }
    }
}

impl Transformer for NameTransformer {
    fn name(&self) -> &str {
        "name"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(1, 2)?;
        for index in 0..args.len() {
            args.str(index)?;
        }
        Ok(())
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
        let (lang, part) = Self::lang_and_part(args, ctx)?;
        write_tagged(target, "name", "use", lang, part, value)
    }

    fn query(&self, source: &Value, args: &Args, ctx: &TransformContext) -> Result<Option<Value>> {
        let (lang, part) = Self::lang_and_part(args, ctx)?;
        read_tagged(source, "name", "use", lang, part)
    }

    fn description(&self) -> &str {
        "Split a name part into the language-tagged name list"
    }
}

/// One identifier in the type-tagged `identifier` list
///
/// `identifier("NATIONAL_ID")` writes `{ identifier: [{ type: "NATIONAL_ID", id: .. }] }`.
pub struct IdentifierTransformer;

impl Transformer for IdentifierTransformer {
    fn name(&self) -> &str {
        "identifier"
    }

    fn validate(&self, args: &Args) -> Result<()> {
        args.expect_count(1, 2)?;
        args.str(0)?;
        args.opt_str(1).map(|_| ())
    }

    fn mutate(
        &self,
        target: &mut Value,
        value: &Value,
        args: &Args,
        _ctx: &TransformContext,
    ) -> Result<()> {
        if !is_present(value) {
            return Ok(());
        }
        let id_type = args.str(0)?;
        let id_field = args.opt_str(1)?.unwrap_or("id");
        write_tagged(target, "identifier", "type", id_type, id_field, value)
    }

    fn query(&self, source: &Value, args: &Args, _ctx: &TransformContext) -> Result<Option<Value>> {
        let id_type = args.str(0)?;
        let id_field = args.opt_str(1)?.unwrap_or("id");
        read_tagged(source, "identifier", "type", id_type, id_field)
    }

    fn description(&self) -> &str {
        "Store an identifier in the type-tagged identifier list"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::builtins::test_support::{op, Harness};
    use serde_json::json;

    #[test]
    fn test_name_parts_share_one_record() {
        let h = Harness::new(json!({}));
        let first = op(json!({"operation": "name", "parameters": ["en", "firstNames"]}));
        let family = op(json!({"operation": "name", "parameters": ["en", "familyName"]}));

        let mut bundle = Value::Null;
        let ctx = h.ctx("child", "firstNamesEng");
        h.registry.mutate(&first, &mut bundle, &json!("Ada"), &ctx).unwrap();
        h.registry.mutate(&family, &mut bundle, &json!("Lovelace"), &ctx).unwrap();

        assert_eq!(
            bundle,
            json!({"name": [{"use": "en", "firstNames": "Ada", "familyName": "Lovelace"}]})
        );
        assert_eq!(h.query(&family, "familyNameEng", &bundle), Some(json!("Lovelace")));
    }

    #[test]
    fn test_name_defaults_to_configured_language() {
        let h = Harness::new(json!({}));
        let first = op(json!({"operation": "name", "parameters": ["firstNames"]}));
        let bundle = h.mutate(&first, "firstNames", json!("Ada"));
        assert_eq!(bundle, json!({"name": [{"use": "en", "firstNames": "Ada"}]}));
    }

    #[test]
    fn test_identifier_round_trip() {
        let h = Harness::new(json!({}));
        let id = op(json!({"operation": "identifier", "parameters": ["NATIONAL_ID"]}));
        let bundle = h.mutate(&id, "iD", json!("1234567890"));
        assert_eq!(bundle, json!({"identifier": [{"type": "NATIONAL_ID", "id": "1234567890"}]}));
        assert_eq!(h.query(&id, "iD", &bundle), Some(json!("1234567890")));
        assert_eq!(h.query(&id, "iD", &json!({"identifier": []})), None);
    }

    #[test]
    fn test_identifier_custom_field() {
        let h = Harness::new(json!({}));
        let id = op(json!({"operation": "identifier", "parameters": ["BIRTH_REGISTRATION_NUMBER", "otherType"]}));
        let bundle = h.mutate(&id, "x", json!("BRN"));
        assert_eq!(bundle["identifier"][0]["otherType"], json!("BRN"));
    }
}
