use super::relation::{KeySource, RelationSpec, Resolver};
use super::spec::{
    AuxiliarySpec, Column, ErrorStyle, FieldDefault, FieldKind, FieldSpec, ResourceSpec, SearchField,
};

pub const NO_CATEGORY: &str = "Sin categoría";
pub const NO_PRODUCT: &str = "Sin producto";
pub const NO_ROLE: &str = "Sin rol";

pub const INCIDENT_STATES: &[&str] = &["pendiente", "resuelto", "no_resuelto"];

pub const GROUPS: AuxiliarySpec = AuxiliarySpec {
    name: "groups",
    path: "groups/",
    optional: false,
    authenticated: false,
};

pub const CATEGORIES: AuxiliarySpec = AuxiliarySpec {
    name: "categories",
    path: "categorias/",
    optional: false,
    authenticated: true,
};

pub const PRODUCT_LOOKUP: AuxiliarySpec = AuxiliarySpec {
    name: "products",
    path: "productos/",
    optional: false,
    authenticated: true,
};

pub const RENTALS: AuxiliarySpec = AuxiliarySpec {
    name: "rentals",
    path: "alquileres/",
    optional: true,
    authenticated: true,
};

pub const EMPLOYEES: ResourceSpec = ResourceSpec {
    name: "employees",
    label: "empleado",
    collection_path: "employees/",
    create_path: "users/create/employee/",
    item_path: "employees/{id}/",
    delete_path: "employees/{id}/",
    detail_path: Some("employees-detail/{id}/"),
    detail_id_fields: Some(&["id_empleados"]),
    status_toggle_path: Some("employees-detail/{id}/inactivar/"),
    authenticated: true,
    id_fields: &["id", "pk"],
    title_field: "username",
    identity_field: Some("username"),
    search_fields: &[SearchField::Field("username"), SearchField::Field("email")],
    relation: None,
    auxiliary: &[GROUPS],
    required_display_fields: &["nombre", "telefono", "direccion"],
    fields: &[
        FieldSpec::text("username").required(),
        FieldSpec::text("email").required(),
        FieldSpec::text("password").required_on_create().create_only(),
        FieldSpec::text("group_id")
            .kind(FieldKind::Relation)
            .required_on_create()
            .sources(&[
                KeySource::Field("group_id"),
                KeySource::Field("groupId"),
                KeySource::Nested("group", "id"),
                KeySource::Nested("group", "pk"),
                KeySource::Nested("rol", "id"),
                KeySource::Nested("rol", "pk"),
            ]),
        FieldSpec::text("nombre"),
        FieldSpec::text("apellido"),
        FieldSpec::text("dni"),
        FieldSpec::text("telefono"),
        FieldSpec::text("direccion"),
        FieldSpec::text("fecha_ingreso").kind(FieldKind::Date),
        FieldSpec::text("is_active")
            .kind(FieldKind::Checkbox)
            .default(FieldDefault::Flag(true)),
    ],
    error_style: ErrorStyle::FirstKnown(&["username", "email", "password", "group_id", "error", "detail"]),
    columns: &[
        Column::Id("ID"),
        Column::Field("USERNAME", "username"),
        Column::Field("EMAIL", "email"),
        Column::List("ROLES", "roles", NO_ROLE),
        Column::Field("ACTIVE", "is_active"),
    ],
};

pub const PRODUCTS: ResourceSpec = ResourceSpec {
    name: "products",
    label: "producto",
    collection_path: "productos/",
    create_path: "productos/",
    item_path: "productos/{id}/",
    delete_path: "productos/{id}/",
    detail_path: None,
    detail_id_fields: None,
    status_toggle_path: None,
    authenticated: true,
    id_fields: &["id_productos", "id"],
    title_field: "nombre_prod",
    identity_field: None,
    search_fields: &[SearchField::Field("nombre_prod"), SearchField::Relation],
    relation: Some(RelationSpec {
        auxiliary: "categories",
        resolvers: &[
            Resolver::Direct("categoria_nombre"),
            Resolver::Nested {
                field: "categoria",
                names: &["nombre_categoria", "nombre"],
            },
            Resolver::Lookup {
                keys: &[KeySource::Field("categoria")],
                id_fields: &["id_categoria", "id"],
                names: &["nombre_categoria"],
            },
            Resolver::Lookup {
                keys: &[KeySource::Field("id_categoria")],
                id_fields: &["id_categoria", "id"],
                names: &["nombre_categoria"],
            },
        ],
        sentinel: NO_CATEGORY,
    }),
    auxiliary: &[CATEGORIES],
    required_display_fields: &[],
    fields: &[
        FieldSpec::text("nombre_prod").required(),
        FieldSpec::text("descripcion"),
        FieldSpec::text("precio").required(),
        FieldSpec::text("stock").required(),
        FieldSpec::text("categoria")
            .kind(FieldKind::Relation)
            .required()
            .sources(&[
                KeySource::Field("categoria"),
                KeySource::Nested("categoria", "id_categoria"),
                KeySource::Nested("categoria", "id"),
                KeySource::Field("id_categoria"),
            ]),
        FieldSpec::text("foto_producto"),
    ],
    error_style: ErrorStyle::JoinAll,
    columns: &[
        Column::Id("ID"),
        Column::Field("NAME", "nombre_prod"),
        Column::Relation("CATEGORY"),
        Column::Field("PRICE", "precio"),
        Column::Field("STOCK", "stock"),
    ],
};

pub const INCIDENTS: ResourceSpec = ResourceSpec {
    name: "incidents",
    label: "incidente",
    collection_path: "incidentes/",
    create_path: "incidentes/create/",
    item_path: "incidentes/{id}/",
    delete_path: "incidentes/{id}/delete/",
    detail_path: None,
    detail_id_fields: None,
    status_toggle_path: None,
    authenticated: true,
    id_fields: &["id", "id_incidente"],
    title_field: "descripcion",
    identity_field: None,
    search_fields: &[
        SearchField::Field("descripcion"),
        SearchField::Field("estado_incidente"),
        SearchField::Relation,
    ],
    relation: Some(RelationSpec {
        auxiliary: "products",
        resolvers: &[Resolver::Lookup {
            keys: &[
                KeySource::Field("producto_id"),
                KeySource::Nested("producto", "id"),
                KeySource::Field("producto"),
            ],
            id_fields: &["id", "id_productos"],
            names: &["nombre", "nombre_prod"],
        }],
        sentinel: NO_PRODUCT,
    }),
    auxiliary: &[PRODUCT_LOOKUP, RENTALS],
    required_display_fields: &[],
    fields: &[
        FieldSpec::text("producto_id").kind(FieldKind::Relation).required().sources(&[
            KeySource::Field("producto_id"),
            KeySource::Nested("producto", "id"),
            KeySource::Field("producto"),
        ]),
        FieldSpec::text("alquiler_id").kind(FieldKind::Relation).required().sources(&[
            KeySource::Field("alquiler_id"),
            KeySource::Nested("alquiler", "id"),
            KeySource::Field("alquiler"),
        ]),
        FieldSpec::text("estado_incidente")
            .required()
            .default(FieldDefault::Text("pendiente")),
        FieldSpec::text("fecha_incidente").kind(FieldKind::Date).required(),
        FieldSpec::text("descripcion").required(),
    ],
    error_style: ErrorStyle::JoinAll,
    columns: &[
        Column::Id("ID"),
        Column::Relation("PRODUCT"),
        Column::Field("DATE", "fecha_incidente"),
        Column::Field("STATE", "estado_incidente"),
    ],
};

pub const ALL: &[&ResourceSpec] = &[&EMPLOYEES, &PRODUCTS, &INCIDENTS];

pub fn by_name(name: &str) -> Option<&'static ResourceSpec> {
    ALL.iter().copied().find(|spec| spec.name == name)
}
