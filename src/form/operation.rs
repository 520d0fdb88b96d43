use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named transform step, possibly composed of nested operations
///
/// ```json
/// { "operation": "nest", "parameters": ["informant", { "operation": "fieldName", "parameters": ["relationship"] }] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub operation: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

/// An operation parameter: a literal, or another operation
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    Literal(Value),
    Operation(Box<Operation>),
}

impl Serialize for Parameter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Parameter::Literal(value) => value.serialize(serializer),
            Parameter::Operation(op) => op.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Parameter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Parameter::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl Parameter {
    /// Objects carrying a string `operation` key are operations, anything else is a literal
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let is_operation = value
            .as_object()
            .and_then(|obj| obj.get("operation"))
            .is_some_and(Value::is_string);
        if is_operation {
            Ok(Parameter::Operation(Box::new(serde_json::from_value(value)?)))
        } else {
            Ok(Parameter::Literal(value))
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Parameter::Literal(value) => Some(value),
            Parameter::Operation(_) => None,
        }
    }

    pub fn as_operation(&self) -> Option<&Operation> {
        match self {
            Parameter::Operation(op) => Some(&**op),
            Parameter::Literal(_) => None,
        }
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Parameter::Literal(value)
    }
}

impl From<&str> for Parameter {
    fn from(value: &str) -> Self {
        Parameter::Literal(Value::String(value.to_string()))
    }
}

impl From<Operation> for Parameter {
    fn from(op: Operation) -> Self {
        Parameter::Operation(Box::new(op))
    }
}

impl Operation {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<Parameter>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    /// This operation followed by every nested operation, depth first
    pub fn walk(&self) -> Vec<&Operation> {
        let mut ops = vec![self];
        for parameter in &self.parameters {
            if let Parameter::Operation(inner) = parameter {
                ops.extend(inner.walk());
            }
        }
        ops
    }
}
