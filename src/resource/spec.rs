use serde_json::Value;

use super::record::{RecordId, ResourceRecord};
use super::relation::{KeySource, RelationSpec};

/// Static description of one entity type. Everything the generic
/// controllers need to know about employees, products or incidents lives here.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    pub name: &'static str,
    /// Singular, for messages ("empleado")
    pub label: &'static str,
    pub collection_path: &'static str,
    pub create_path: &'static str,
    /// Paths below are templates with an `{id}` placeholder
    pub item_path: &'static str,
    pub delete_path: &'static str,
    pub detail_path: Option<&'static str>,
    /// Keys the detail endpoint looks records up by, when they differ from
    /// `id_fields`
    pub detail_id_fields: Option<&'static [&'static str]>,
    pub status_toggle_path: Option<&'static str>,
    /// Whether requests for this entity carry the bearer credential
    pub authenticated: bool,
    pub id_fields: &'static [&'static str],
    /// Field shown in prompts and notices
    pub title_field: &'static str,
    /// Username field checked by the protected/self guards; `None` means the
    /// entity is never guarded
    pub identity_field: Option<&'static str>,
    pub search_fields: &'static [SearchField],
    pub relation: Option<RelationSpec>,
    pub auxiliary: &'static [AuxiliarySpec],
    /// Records missing any of these are "incomplete" and offered for cleanup
    pub required_display_fields: &'static [&'static str],
    pub fields: &'static [FieldSpec],
    pub error_style: ErrorStyle,
    pub columns: &'static [Column],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxiliarySpec {
    pub name: &'static str,
    pub path: &'static str,
    /// Failure degrades to an empty collection instead of failing the load
    pub optional: bool,
    pub authenticated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Field(&'static str),
    /// The resolved relation display name
    Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Stored as a boolean in the draft
    Checkbox,
    /// Foreign key; coerced to a number or null on submit
    Relation,
    /// `YYYY-MM-DD`; empty becomes null on submit
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    OnCreate,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Empty,
    Text(&'static str),
    Flag(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: Requirement,
    pub default: FieldDefault,
    /// Only part of the create form (passwords)
    pub create_only: bool,
    /// Where an edit form finds the current value; empty means `name` itself
    pub sources: &'static [KeySource],
}

impl FieldSpec {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            required: Requirement::Optional,
            default: FieldDefault::Empty,
            create_only: false,
            sources: &[],
        }
    }

    pub const fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = Requirement::Always;
        self
    }

    pub const fn required_on_create(mut self) -> Self {
        self.required = Requirement::OnCreate;
        self
    }

    pub const fn default(mut self, default: FieldDefault) -> Self {
        self.default = default;
        self
    }

    pub const fn create_only(mut self) -> Self {
        self.create_only = true;
        self
    }

    pub const fn sources(mut self, sources: &'static [KeySource]) -> Self {
        self.sources = sources;
        self
    }

    pub fn is_required(&self, creating: bool) -> bool {
        match self.required {
            Requirement::Always => true,
            Requirement::OnCreate => creating,
            Requirement::Optional => false,
        }
    }
}

/// How a validation payload is turned into one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// First of these fields present wins
    FirstKnown(&'static [&'static str]),
    /// Every entry as `field: msg1, msg2`, one per line
    JoinAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id(&'static str),
    Field(&'static str, &'static str),
    Relation(&'static str),
    /// Array field joined with `, `, or the sentinel when empty
    List(&'static str, &'static str, &'static str),
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id(header) | Column::Field(header, _) | Column::Relation(header) => header,
            Column::List(header, _, _) => header,
        }
    }
}

impl ResourceSpec {
    pub fn item_path_for(&self, id: &RecordId) -> String {
        self.item_path.replace("{id}", id.as_str())
    }

    pub fn delete_path_for(&self, id: &RecordId) -> String {
        self.delete_path.replace("{id}", id.as_str())
    }

    pub fn detail_path_for(&self, id: &RecordId) -> String {
        self.detail_path.unwrap_or(self.item_path).replace("{id}", id.as_str())
    }

    pub fn status_toggle_path_for(&self, id: &RecordId) -> Option<String> {
        self.status_toggle_path.map(|path| path.replace("{id}", id.as_str()))
    }

    pub fn record_id(&self, record: &ResourceRecord) -> Option<RecordId> {
        record.id(self.id_fields)
    }

    pub fn detail_id(&self, record: &ResourceRecord) -> Option<RecordId> {
        match self.detail_id_fields {
            Some(fields) => record.id(fields),
            None => self.record_id(record),
        }
    }

    pub fn title(&self, record: &ResourceRecord) -> String {
        let title = record.text(self.title_field);
        if title.is_empty() {
            self.record_id(record).map(|id| id.to_string()).unwrap_or_default()
        } else {
            title
        }
    }

    pub fn identity<'r>(&self, record: &'r ResourceRecord) -> Option<&'r str> {
        self.identity_field.and_then(|field| record.get_str(field))
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn is_incomplete(&self, record: &ResourceRecord) -> bool {
        self.required_display_fields.iter().any(|field| record.is_blank(field))
    }

    pub fn relation_name(&self, record: &ResourceRecord, auxiliary: &[ResourceRecord]) -> Option<String> {
        self.relation.map(|relation| relation.resolve(record, auxiliary))
    }

    /// Cell text for a list column
    pub fn cell(&self, column: &Column, record: &ResourceRecord, auxiliary: &[ResourceRecord]) -> String {
        match column {
            Column::Id(_) => self.record_id(record).map(|id| id.to_string()).unwrap_or_default(),
            Column::Field(_, field) => record.text(field),
            Column::Relation(_) => self.relation_name(record, auxiliary).unwrap_or_default(),
            Column::List(_, field, sentinel) => {
                let items: Vec<String> = record
                    .get(field)
                    .and_then(Value::as_array)
                    .map(|items| items.iter().map(super::record::scalar_text).collect())
                    .unwrap_or_default();
                if items.is_empty() {
                    sentinel.to_string()
                } else {
                    items.join(", ")
                }
            }
        }
    }
}
