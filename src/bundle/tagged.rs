//! Arrays of records told apart by a tag key
//!
//! `name: [{use: "en", ..}]`, `identifier: [{type: "NATIONAL_ID", ..}]` and
//! `reasonsNotApplying: [{primaryCaregiverType: "MOTHER", ..}]` all share this shape.

use super::path::kind_of;
use crate::error::{FormError, Result};
use serde_json::{Map, Value};

/// Record in `list` whose `tag_key` equals `tag`, appended when absent
pub fn upsert_tagged<'a>(
    list: &'a mut Value,
    tag_key: &str,
    tag: &Value,
) -> Result<&'a mut Map<String, Value>> {
    if list.is_null() {
        *list = Value::Array(Vec::new());
    }
    let found = kind_of(list);
    let items = list.as_array_mut().ok_or_else(|| {
        FormError::mismatch(format!(
            "records tagged by '{}' must be an array, found {}",
            tag_key, found
        ))
    })?;

    let position = items
        .iter()
        .position(|item| item.get(tag_key) == Some(tag));
    let index = match position {
        Some(i) => i,
        None => {
            let mut record = Map::new();
            record.insert(tag_key.to_string(), tag.clone());
            items.push(Value::Object(record));
            items.len() - 1
        }
    };

    items[index].as_object_mut().ok_or_else(|| {
        FormError::mismatch(format!("record tagged '{}' is not an object", tag))
    })
}

/// Every record in `list` whose `tag_key` equals `tag`, in array order
pub fn find_tagged<'a>(list: &'a Value, tag_key: &str, tag: &Value) -> Result<Vec<&'a Value>> {
    match list {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .iter()
            .filter(|item| item.get(tag_key) == Some(tag))
            .collect()),
        other => Err(FormError::mismatch(format!(
            "records tagged by '{}' must be an array, found {}",
            tag_key,
            kind_of(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upsert_creates_then_reuses() {
        let mut list = Value::Null;
        upsert_tagged(&mut list, "use", &json!("en"))
            .unwrap()
            .insert("firstNames".into(), json!("Jane"));
        upsert_tagged(&mut list, "use", &json!("en"))
            .unwrap()
            .insert("familyName".into(), json!("Doe"));

        assert_eq!(
            list,
            json!([{"use": "en", "firstNames": "Jane", "familyName": "Doe"}])
        );
    }

    #[test]
    fn test_find_tagged_keeps_order() {
        let list = json!([
            {"type": "A", "id": 1},
            {"type": "B", "id": 2},
            {"type": "A", "id": 3}
        ]);
        let found = find_tagged(&list, "type", &json!("A")).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["id"], json!(1));
    }

    #[test]
    fn test_wrong_kind_is_mismatch() {
        let mut list = json!({"use": "en"});
        assert!(upsert_tagged(&mut list, "use", &json!("en")).is_err());
        assert!(find_tagged(&json!("x"), "use", &json!("en")).is_err());
    }
}
