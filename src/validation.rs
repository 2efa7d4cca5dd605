//! Typed validation of tool arguments.
//!
//! Arguments arrive from the model as untyped JSON. [`validate`] checks them
//! against a typed shape (enumerated fields, allowed value sets, serde
//! defaults) and returns either the typed value or a [`ValidationError`]
//! describing what was wrong. Nothing here panics or touches a store.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// A human-readable description of why arguments were rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Parse `value` into `T`
///
/// `null` is read as an empty object so that every optional field falls back
/// to its default.
pub fn validate<T: DeserializeOwned>(value: &Value) -> Result<T, ValidationError> {
    let value = match value {
        Value::Null => json!({}),
        other => other.clone(),
    };
    serde_json::from_value(value).map_err(|e| ValidationError(e.to_string()))
}

/// Structured tool output reported back to the model
///
/// Serialises as `{"success": true, ...payload}` or
/// `{"success": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(Value),
    Failure(String),
}

impl ToolOutcome {
    /// A success carrying the fields of `payload` alongside `success: true`
    pub fn success<T: Serialize>(payload: T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => ToolOutcome::Success(value),
            Err(e) => ToolOutcome::Failure(e.to_string()),
        }
    }

    /// A success with no payload
    pub fn ok() -> Self {
        ToolOutcome::Success(json!({}))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            ToolOutcome::Success(payload) => {
                let mut object = serde_json::Map::new();
                object.insert("success".to_string(), Value::Bool(true));
                if let Value::Object(fields) = payload {
                    object.extend(fields);
                }
                Value::Object(object)
            }
            ToolOutcome::Failure(error) => json!({ "success": false, "error": error }),
        }
    }
}

impl From<ValidationError> for ToolOutcome {
    fn from(err: ValidationError) -> Self {
        ToolOutcome::Failure(err.0)
    }
}
