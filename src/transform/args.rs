//! Typed access to an operation's static parameters

use crate::bundle::{AddressComponent, BundlePath};
use crate::error::{helpers::common, ErrorCode, FormError, Result};
use crate::form::{Operation, Parameter};
use serde_json::Value;

#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    operation: &'a str,
    params: &'a [Parameter],
}

impl<'a> Args<'a> {
    pub fn new(operation: &'a Operation) -> Self {
        Self {
            operation: &operation.operation,
            params: &operation.parameters,
        }
    }

    pub fn operation(&self) -> &'a str {
        self.operation
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn literal(&self, index: usize) -> Option<&'a Value> {
        self.params.get(index).and_then(Parameter::as_literal)
    }

    /// Required string parameter
    pub fn str(&self, index: usize) -> Result<&'a str> {
        self.literal(index)
            .and_then(Value::as_str)
            .ok_or_else(|| common::invalid_parameter(self.operation, index, "a string"))
    }

    /// Optional string parameter; present but not a string is an error
    pub fn opt_str(&self, index: usize) -> Result<Option<&'a str>> {
        match self.params.get(index) {
            None => Ok(None),
            Some(Parameter::Literal(Value::Null)) => Ok(None),
            Some(_) => self.str(index).map(Some),
        }
    }

    /// Optional bundle path parameter
    pub fn path(&self, index: usize) -> Result<Option<BundlePath>> {
        match self.opt_str(index)? {
            Some(raw) => BundlePath::parse(raw)
                .map(Some)
                .map_err(|e| {
                    common::invalid_parameter(self.operation, index, "a bundle path").with_source(e)
                }),
            None => Ok(None),
        }
    }

    /// Address line offset or address key
    pub fn address_component(&self, index: usize) -> Result<AddressComponent> {
        self.literal(index)
            .and_then(AddressComponent::from_param)
            .ok_or_else(|| {
                common::invalid_parameter(
                    self.operation,
                    index,
                    "an address line offset 0-10 or an address key",
                )
            })
    }

    /// Optional nested operation; present but literal is an error
    pub fn opt_nested(&self, index: usize) -> Result<Option<&'a Operation>> {
        match self.params.get(index) {
            None => Ok(None),
            Some(Parameter::Operation(op)) => Ok(Some(&**op)),
            Some(Parameter::Literal(_)) => Err(common::invalid_parameter(
                self.operation,
                index,
                "an operation",
            )),
        }
    }

    pub fn expect_count(&self, min: usize, max: usize) -> Result<()> {
        if (min..=max).contains(&self.params.len()) {
            return Ok(());
        }
        let expected = if min == max {
            format!("{}", max)
        } else {
            format!("{} to {}", min, max)
        };
        Err(FormError::configuration_with_code(
            ErrorCode::CONFIG_INVALID_PARAMETER,
            format!(
                "operation '{}' takes {} parameters, got {}",
                self.operation,
                expected,
                self.params.len()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::AddressLine;
    use serde_json::json;

    fn op(value: Value) -> Operation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_typed_access() {
        let operation = op(json!({"operation": "address", "parameters": ["PERMANENT", 6]}));
        let args = Args::new(&operation);
        assert_eq!(args.str(0).unwrap(), "PERMANENT");
        assert_eq!(
            args.address_component(1).unwrap(),
            AddressComponent::Line(AddressLine::Chief)
        );
        assert!(args.str(1).is_err());
        assert_eq!(args.opt_str(2).unwrap(), None);
        assert!(args.expect_count(2, 2).is_ok());
        assert!(args.expect_count(0, 1).is_err());
    }

    #[test]
    fn test_nested_parameter() {
        let operation = op(json!({
            "operation": "nest",
            "parameters": ["informant", {"operation": "fieldName"}]
        }));
        let args = Args::new(&operation);
        assert_eq!(args.opt_nested(1).unwrap().unwrap().operation, "fieldName");
        assert!(args.opt_nested(0).is_err());
        assert_eq!(args.path(0).unwrap().unwrap().to_string(), "informant");
    }
}
