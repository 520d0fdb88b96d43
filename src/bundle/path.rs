//! Dotted/indexed paths into bundle values
//!
//! `registration.contactPhoneNumber`, `address[0].line[6]`, `name.0.firstNames`.
//! Reads never fail: a missing segment yields `None`. Writes create missing
//! intermediate objects/arrays and leave sibling keys alone.

use crate::error::{ErrorCode, FormError, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One step of a [`BundlePath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "{}", k),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BundlePath {
    segments: Vec<PathSegment>,
}

impl BundlePath {
    /// The empty path, addressing the value itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path expression
    pub fn parse(expr: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut current = expr.trim();

        if let Some(rest) = current.strip_prefix('$') {
            current = rest.strip_prefix('.').unwrap_or(rest);
        }

        while !current.is_empty() {
            if let Some(rest) = current.strip_prefix('[') {
                let end = rest.find(']').ok_or_else(|| {
                    FormError::path(ErrorCode::PATH_INVALID_INDEX, "unclosed '['", expr)
                })?;
                segments.push(PathSegment::Index(Self::parse_index(&rest[..end], expr)?));
                current = &rest[end + 1..];
            } else {
                let end = current.find(['.', '[']).unwrap_or(current.len());
                let key = &current[..end];
                if key.is_empty() {
                    return Err(FormError::path(
                        ErrorCode::PATH_EMPTY_SEGMENT,
                        "empty path segment",
                        expr,
                    ));
                }
                if key.chars().all(|c| c.is_ascii_digit()) {
                    segments.push(PathSegment::Index(Self::parse_index(key, expr)?));
                } else {
                    segments.push(PathSegment::Key(key.to_string()));
                }
                current = &current[end..];
            }

            if let Some(rest) = current.strip_prefix('.') {
                if rest.is_empty() {
                    return Err(FormError::path(
                        ErrorCode::PATH_EMPTY_SEGMENT,
                        "trailing '.'",
                        expr,
                    ));
                }
                current = rest;
            }
        }

        Ok(Self { segments })
    }

    fn parse_index(raw: &str, expr: &str) -> Result<usize> {
        raw.trim().parse::<usize>().map_err(|_| {
            FormError::path(
                ErrorCode::PATH_INVALID_INDEX,
                format!("'{}' is not an array index", raw),
                expr,
            )
        })
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment and the remaining path
    pub fn split_first(&self) -> Option<(&PathSegment, BundlePath)> {
        self.segments
            .split_first()
            .map(|(head, tail)| (head, BundlePath::from_segments(tail.to_vec())))
    }

    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    pub fn join(&self, other: &BundlePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Resolve the path; `None` when any step is missing or of the wrong kind
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match (segment, current) {
                (PathSegment::Key(k), Value::Object(obj)) => obj.get(k)?,
                (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Copy-on-write set: returns a new value, `value` is untouched
    pub fn set(&self, value: &Value, new_value: Value) -> Result<Value> {
        let mut updated = value.clone();
        self.set_in_place(&mut updated, new_value)?;
        Ok(updated)
    }

    /// Set within an owned accumulator
    pub fn set_in_place(&self, value: &mut Value, new_value: Value) -> Result<()> {
        *self.get_or_create(value)? = new_value;
        Ok(())
    }

    /// Mutable slot at this path, creating `null` intermediates as containers.
    /// A non-null intermediate of the wrong kind is a transform mismatch.
    pub fn get_or_create<'a>(&self, value: &'a mut Value) -> Result<&'a mut Value> {
        let mut current = value;
        for segment in &self.segments {
            current = match segment {
                PathSegment::Key(k) => {
                    if current.is_null() {
                        *current = Value::Object(Map::new());
                    }
                    match current {
                        Value::Object(obj) => obj.entry(k.clone()).or_insert(Value::Null),
                        other => {
                            return Err(FormError::mismatch(format!(
                                "cannot write key '{}' into {} at '{}'",
                                k,
                                kind_of(other),
                                self
                            )))
                        }
                    }
                }
                PathSegment::Index(i) => {
                    if current.is_null() {
                        *current = Value::Array(Vec::new());
                    }
                    match current {
                        Value::Array(arr) => {
                            if arr.len() <= *i {
                                arr.resize(*i + 1, Value::Null);
                            }
                            &mut arr[*i]
                        }
                        other => {
                            return Err(FormError::mismatch(format!(
                                "cannot write index {} into {} at '{}'",
                                i,
                                kind_of(other),
                                self
                            )))
                        }
                    }
                }
            };
        }
        Ok(current)
    }

    /// Remove the value at this path, returning it
    pub fn remove(&self, value: &mut Value) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        let parent = BundlePath::from_segments(parents.to_vec());
        let mut current = value;
        for segment in parent.segments() {
            current = match (segment, current) {
                (PathSegment::Key(k), Value::Object(obj)) => obj.get_mut(k)?,
                (PathSegment::Index(i), Value::Array(arr)) => arr.get_mut(*i)?,
                _ => return None,
            };
        }
        match (last, current) {
            (PathSegment::Key(k), Value::Object(obj)) => obj.remove(k),
            (PathSegment::Index(i), Value::Array(arr)) if *i < arr.len() => {
                Some(std::mem::replace(&mut arr[*i], Value::Null))
            }
            _ => None,
        }
    }
}

/// Short name of a JSON value's kind, for error messages
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl fmt::Display for BundlePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i > 0 => write!(f, ".{}", k)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

impl FromStr for BundlePath {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keys_and_indices() {
        let path = BundlePath::parse("address[0].line[6]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("address".into()),
                PathSegment::Index(0),
                PathSegment::Key("line".into()),
                PathSegment::Index(6),
            ]
        );
        assert_eq!(path.to_string(), "address[0].line[6]");
    }

    #[test]
    fn test_parse_numeric_dotted_segment() {
        let path = BundlePath::parse("name.0.firstNames").unwrap();
        assert_eq!(path.segments()[1], PathSegment::Index(0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(BundlePath::parse("a..b").is_err());
        assert!(BundlePath::parse("a[x]").is_err());
        assert!(BundlePath::parse("a[1").is_err());
        assert!(BundlePath::parse("a.").is_err());
    }

    #[test]
    fn test_get_missing_is_none() {
        let bundle = json!({"registration": {"contact": "MOTHER"}});
        let path = BundlePath::parse("registration.contactPhoneNumber").unwrap();
        assert_eq!(path.get(&bundle), None);
        let deep = BundlePath::parse("mother.address[3].line[6]").unwrap();
        assert_eq!(deep.get(&bundle), None);
    }

    #[test]
    fn test_set_keeps_siblings_and_input() {
        let bundle = json!({"registration": {"contact": "MOTHER"}});
        let path = BundlePath::parse("registration.contactPhoneNumber").unwrap();
        let updated = path.set(&bundle, json!("+260711111111")).unwrap();

        assert_eq!(
            updated,
            json!({"registration": {"contact": "MOTHER", "contactPhoneNumber": "+260711111111"}})
        );
        assert_eq!(bundle, json!({"registration": {"contact": "MOTHER"}}));
    }

    #[test]
    fn test_set_creates_and_pads_arrays() {
        let path = BundlePath::parse("address[2].line[1]").unwrap();
        let updated = path.set(&Value::Null, json!("12")).unwrap();
        assert_eq!(updated["address"].as_array().unwrap().len(), 3);
        assert_eq!(updated["address"][0], Value::Null);
        assert_eq!(updated["address"][2]["line"], json!([null, "12"]));
    }

    #[test]
    fn test_set_through_scalar_is_mismatch() {
        let path = BundlePath::parse("informant.relationship").unwrap();
        let err = path.set(&json!({"informant": "MOTHER"}), json!("x")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TRANSFORM_MISMATCH);
    }

    #[test]
    fn test_remove() {
        let mut bundle = json!({"a": {"b": 1, "c": 2}});
        let removed = BundlePath::parse("a.b").unwrap().remove(&mut bundle);
        assert_eq!(removed, Some(json!(1)));
        assert_eq!(bundle, json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_root_path() {
        let root = BundlePath::parse("").unwrap();
        assert!(root.is_root());
        let v = json!({"x": 1});
        assert_eq!(root.get(&v), Some(&v));
    }
}
