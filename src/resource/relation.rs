//! Display-name resolution for foreign keys that arrive in several shapes.
//!
//! A relation is resolved by walking an ordered list of strategies; the
//! first one that yields a non-empty name wins, otherwise the relation's
//! sentinel is shown.

use serde_json::Value;

use super::record::{scalar_text, RecordId, ResourceRecord};

/// Where a foreign-key value can be found on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// `record[field]` holding a raw id (number or string)
    Field(&'static str),
    /// `record[field][sub]` when `record[field]` is an object
    Nested(&'static str, &'static str),
}

impl KeySource {
    pub fn extract(&self, record: &ResourceRecord) -> Option<RecordId> {
        match self {
            KeySource::Field(field) => record.get(field).and_then(RecordId::from_value),
            KeySource::Nested(field, sub) => record
                .get(field)
                .and_then(Value::as_object)
                .and_then(|obj| obj.get(*sub))
                .and_then(RecordId::from_value),
        }
    }
}

/// First source that yields an id
pub fn first_key(record: &ResourceRecord, sources: &[KeySource]) -> Option<RecordId> {
    sources.iter().find_map(|source| source.extract(record))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolver {
    /// A denormalised name on the record itself (`categoria_nombre`)
    Direct(&'static str),
    /// The relation embedded as an object; first non-empty name field
    Nested {
        field: &'static str,
        names: &'static [&'static str],
    },
    /// Foreign key looked up in the auxiliary collection
    Lookup {
        keys: &'static [KeySource],
        id_fields: &'static [&'static str],
        names: &'static [&'static str],
    },
}

impl Resolver {
    fn resolve(&self, record: &ResourceRecord, auxiliary: &[ResourceRecord]) -> Option<String> {
        match self {
            Resolver::Direct(field) => non_empty(record.get(field)),
            Resolver::Nested { field, names } => {
                let nested = record.get(field).and_then(Value::as_object)?;
                names.iter().find_map(|name| non_empty(nested.get(*name)))
            }
            Resolver::Lookup { keys, id_fields, names } => {
                let key = first_key(record, keys)?;
                let target = auxiliary
                    .iter()
                    .find(|candidate| candidate.id(id_fields).as_ref() == Some(&key))?;
                names.iter().find_map(|name| non_empty(target.get(name)))
            }
        }
    }
}

/// How one entity names its relation to an auxiliary collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec {
    /// Name of the auxiliary collection looked up by `Resolver::Lookup`
    pub auxiliary: &'static str,
    pub resolvers: &'static [Resolver],
    pub sentinel: &'static str,
}

impl RelationSpec {
    pub fn resolve(&self, record: &ResourceRecord, auxiliary: &[ResourceRecord]) -> String {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(record, auxiliary))
            .unwrap_or_else(|| self.sentinel.to_string())
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    let text = scalar_text(value?);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::catalog::{INCIDENTS, PRODUCTS};
    use serde_json::json;

    fn rec(value: Value) -> ResourceRecord {
        ResourceRecord::from_value(value).unwrap()
    }

    fn categories() -> Vec<ResourceRecord> {
        vec![
            rec(json!({"id_categoria": 1, "nombre_categoria": "Muebles"})),
            rec(json!({"id_categoria": 2, "nombre_categoria": "Vajilla"})),
        ]
    }

    #[test]
    fn category_resolution_order() {
        let relation = PRODUCTS.relation.unwrap();
        let cats = categories();

        let direct = rec(json!({"categoria_nombre": "Directa", "categoria": 2}));
        assert_eq!(relation.resolve(&direct, &cats), "Directa");

        let nested = rec(json!({"categoria": {"id_categoria": 2, "nombre_categoria": "Anidada"}}));
        assert_eq!(relation.resolve(&nested, &cats), "Anidada");

        let nested_alt = rec(json!({"categoria": {"id": 9, "nombre": "Alternativa"}}));
        assert_eq!(relation.resolve(&nested_alt, &cats), "Alternativa");

        let by_key = rec(json!({"categoria": 2}));
        assert_eq!(relation.resolve(&by_key, &cats), "Vajilla");

        let by_alt_key = rec(json!({"id_categoria": "1"}));
        assert_eq!(relation.resolve(&by_alt_key, &cats), "Muebles");

        let dangling = rec(json!({"categoria": 99}));
        assert_eq!(relation.resolve(&dangling, &cats), "Sin categoría");

        let none = rec(json!({"nombre_prod": "Mesa"}));
        assert_eq!(relation.resolve(&none, &cats), "Sin categoría");
    }

    #[test]
    fn product_resolution_for_incidents() {
        let relation = INCIDENTS.relation.unwrap();
        let products = vec![
            rec(json!({"id": 3, "nombre": "Carpa"})),
            rec(json!({"id_productos": 4, "nombre_prod": "Silla"})),
        ];

        assert_eq!(relation.resolve(&rec(json!({"producto_id": "3"})), &products), "Carpa");
        assert_eq!(relation.resolve(&rec(json!({"producto": {"id": 4}})), &products), "Silla");
        assert_eq!(relation.resolve(&rec(json!({"producto": 3})), &products), "Carpa");
        assert_eq!(relation.resolve(&rec(json!({"producto": null})), &products), "Sin producto");
    }
}
