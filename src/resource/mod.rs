pub mod catalog;
pub mod record;
pub mod relation;
pub mod spec;

pub use record::{RecordId, ResourceRecord};
pub use relation::{first_key, KeySource, RelationSpec, Resolver};
pub use spec::{
    AuxiliarySpec, Column, ErrorStyle, FieldDefault, FieldKind, FieldSpec, Requirement, ResourceSpec,
    SearchField,
};
