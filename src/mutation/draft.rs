use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ClientError;
use crate::resource::record::scalar_text;
use crate::resource::{first_key, FieldDefault, FieldKind, FieldSpec, KeySource, ResourceRecord, ResourceSpec};

/// One field of the in-memory form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw input, uncoerced until submit
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            FieldValue::Text(_) => None,
        }
    }
}

/// Form state for one record. Always written back as a complete payload.
#[derive(Debug, Clone)]
pub struct Draft {
    spec: &'static ResourceSpec,
    creating: bool,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Draft {
    /// Empty create form with every field at its default
    pub fn blank(spec: &'static ResourceSpec) -> Self {
        let values = spec
            .fields
            .iter()
            .map(|field| (field.name, default_value(field)))
            .collect();
        Self {
            spec,
            creating: true,
            values,
        }
    }

    /// Edit form pre-filled from a fetched record. Create-only fields
    /// (passwords) are left out entirely.
    pub fn from_record(spec: &'static ResourceSpec, record: &ResourceRecord) -> Self {
        let values = spec
            .fields
            .iter()
            .filter(|field| !field.create_only)
            .map(|field| (field.name, value_from_record(field, record)))
            .collect();
        Self {
            spec,
            creating: false,
            values,
        }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Text of a field; empty for flags and unknown fields
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<&'static str, FieldValue> {
        &self.values
    }

    /// Store raw input. Checkbox fields parse the input as a boolean;
    /// everything else is kept verbatim.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), ClientError> {
        let field = self.editable_field(name)?;
        let value = match field.kind {
            FieldKind::Checkbox => FieldValue::Flag(parse_flag(raw)),
            _ => FieldValue::Text(raw.to_string()),
        };
        self.values.insert(field.name, value);
        Ok(())
    }

    pub fn set_flag(&mut self, name: &str, flag: bool) -> Result<(), ClientError> {
        let field = self.editable_field(name)?;
        let value = match field.kind {
            FieldKind::Checkbox => FieldValue::Flag(flag),
            _ => FieldValue::Text(flag.to_string()),
        };
        self.values.insert(field.name, value);
        Ok(())
    }

    /// Back to the blank create form
    pub fn reset(&mut self) {
        *self = Self::blank(self.spec);
    }

    /// Required fields that are still blank, in declaration order
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.spec
            .fields
            .iter()
            .filter(|field| field.is_required(self.creating))
            .filter(|field| match self.values.get(field.name) {
                Some(FieldValue::Text(text)) => text.trim().is_empty(),
                Some(FieldValue::Flag(_)) => false,
                None => true,
            })
            .map(|field| field.name)
            .collect()
    }

    /// JSON body for submit: strings trimmed, relation fields as a number or
    /// null, empty dates as null, checkboxes as booleans. Every other field is
    /// sent as the string that was entered.
    pub fn payload(&self) -> Value {
        let mut body = Map::new();
        for (name, value) in &self.values {
            let kind = self.spec.field(name).map(|field| field.kind).unwrap_or(FieldKind::Text);
            body.insert(name.to_string(), payload_value(kind, value));
        }
        Value::Object(body)
    }

    fn editable_field(&self, name: &str) -> Result<&'static FieldSpec, ClientError> {
        match self.spec.field(name) {
            Some(field) if self.creating || !field.create_only => Ok(field),
            _ => Err(ClientError::UnknownField {
                resource: self.spec.name,
                field: name.to_string(),
            }),
        }
    }
}

fn default_value(field: &FieldSpec) -> FieldValue {
    match (field.default, field.kind) {
        (FieldDefault::Flag(flag), _) => FieldValue::Flag(flag),
        (_, FieldKind::Checkbox) => FieldValue::Flag(false),
        (FieldDefault::Text(text), _) => FieldValue::Text(text.to_string()),
        (FieldDefault::Empty, _) => FieldValue::Text(String::new()),
    }
}

fn value_from_record(field: &FieldSpec, record: &ResourceRecord) -> FieldValue {
    match field.kind {
        FieldKind::Checkbox => match record.get(field.name) {
            Some(Value::Bool(flag)) => FieldValue::Flag(*flag),
            None | Some(Value::Null) => default_value(field),
            Some(other) => FieldValue::Flag(parse_flag(&scalar_text(other))),
        },
        FieldKind::Relation => {
            let own = [KeySource::Field(field.name)];
            let sources = if field.sources.is_empty() { &own[..] } else { field.sources };
            FieldValue::Text(first_key(record, sources).map(|id| id.to_string()).unwrap_or_default())
        }
        FieldKind::Date => FieldValue::Text(normalize_date(&record.text(field.name))),
        FieldKind::Text => FieldValue::Text(record.text(field.name)),
    }
}

fn payload_value(kind: FieldKind, value: &FieldValue) -> Value {
    let text = match value {
        FieldValue::Flag(flag) => return Value::Bool(*flag),
        FieldValue::Text(text) => text.trim(),
    };

    match kind {
        FieldKind::Relation => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        FieldKind::Date if text.is_empty() => Value::Null,
        FieldKind::Checkbox => Value::Bool(parse_flag(text)),
        _ => Value::String(text.to_string()),
    }
}

/// Checkbox input as typed on a command line
pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on" | "si" | "sí"
    )
}

/// Dates come back as `YYYY-MM-DD` or as full timestamps; the form only keeps
/// the date part. Unparseable input becomes empty.
pub fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return timestamp.date().format("%Y-%m-%d").to_string();
    }
    String::new()
}
