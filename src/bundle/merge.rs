use serde_json::Value;

/// Deep-merge `overlay` into `base`. Objects merge key by key; anything else in
/// `overlay` replaces what `base` had, except `null` which never erases data.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            for (key, value) in overlay_obj {
                match base_obj.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_obj.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

/// Merge returning a new value
pub fn merged(base: &Value, overlay: &Value) -> Value {
    let mut result = base.clone();
    deep_merge(&mut result, overlay.clone());
    result
}

/// Whether a value carries anything worth writing or returning
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}
