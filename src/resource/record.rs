use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ClientError;

/// Identifier of a remote record, compared as text so that `3` and `"3"`
/// refer to the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Numbers and non-empty strings are identifiers; anything else is not
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// JSON form for payloads: a number when the text is numeric
    pub fn to_value(&self) -> Value {
        self.0
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(self.0.clone()))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loosely-typed record exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRecord {
    fields: Map<String, Value>,
}

impl ResourceRecord {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(ClientError::InvalidResponse(format!(
                "expected JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// Decode a list response. Non-object entries make the whole list invalid.
    pub fn collection(value: Value) -> Result<Vec<Self>, ClientError> {
        match value {
            Value::Array(items) => items.into_iter().map(Self::from_value).collect(),
            other => Err(ClientError::InvalidResponse(format!(
                "expected JSON array, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Display text of a scalar field; empty for null, absent or nested values
    pub fn text(&self, key: &str) -> String {
        self.fields.get(key).map(scalar_text).unwrap_or_default()
    }

    /// Null, absent, or a whitespace-only string
    pub fn is_blank(&self, key: &str) -> bool {
        match self.fields.get(key) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    /// First candidate field that holds a usable identifier
    pub fn id(&self, candidates: &[&str]) -> Option<RecordId> {
        candidates
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(RecordId::from_value))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
