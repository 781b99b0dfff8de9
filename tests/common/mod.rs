#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use tienda_admin::auth::StaticToken;
use tienda_admin::config::ClientConfig;
use tienda_admin::ApiClient;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

/// One request as the stub saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// In-memory REST backend with the same routes as the real API.
#[derive(Debug, Default)]
pub struct Data {
    pub me: Value,
    pub employees: Vec<Value>,
    pub groups: Vec<Value>,
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub incidents: Vec<Value>,
    pub rentals: Option<Vec<Value>>,
    /// Paths whose DELETE answers 500
    pub failing_deletes: HashSet<String>,
    pub seen: Vec<Seen>,
    next_id: i64,
}

impl Data {
    pub fn seeded() -> Self {
        Self {
            me: json!({"id": 2, "id_empleados": 12, "username": "jperez", "roles": ["Admin"]}),
            employees: vec![
                json!({"id": 1, "id_empleados": 11, "username": "briadmin", "email": "admin@tienda.com", "nombre": "", "telefono": "", "direccion": "", "roles": ["Admin"], "is_active": true}),
                json!({"id": 2, "username": "jperez", "email": "jperez@x.com", "nombre": "Juan", "telefono": "111", "direccion": "Calle 1", "roles": ["Admin"], "is_active": true}),
                json!({"id": 3, "id_empleados": 13, "username": "mgomez", "email": "mgomez@x.com", "nombre": "María", "telefono": "", "direccion": "Calle 3", "roles": [], "is_active": true}),
                json!({"id": 4, "id_empleados": 14, "username": "lruiz", "email": "lruiz@x.com", "nombre": null, "telefono": "444", "direccion": "Calle 4", "roles": ["Ventas"], "is_active": true}),
            ],
            groups: vec![json!({"id": 1, "name": "Admin"}), json!({"id": 2, "name": "Ventas"})],
            products: vec![
                json!({"id_productos": 7, "nombre_prod": "Silla plegable", "descripcion": "", "precio": "10.00", "stock": 4, "categoria": 1}),
                json!({"id_productos": 8, "nombre_prod": "Mesa redonda", "descripcion": "", "precio": "55.00", "stock": 2, "categoria": {"id_categoria": 2, "nombre_categoria": "Mesas"}}),
                json!({"id_productos": 9, "nombre_prod": "Copa", "descripcion": "", "precio": "1.50", "stock": 100, "categoria": null}),
            ],
            categories: vec![
                json!({"id_categoria": 1, "nombre_categoria": "Sillas"}),
                json!({"id_categoria": 2, "nombre_categoria": "Mesas"}),
            ],
            incidents: vec![
                json!({"id": 1, "producto_id": 7, "descripcion": "Pata rota", "estado_incidente": "pendiente", "fecha_incidente": "2024-05-02"}),
                json!({"id": 2, "producto": {"id": 8}, "descripcion": "Mancha", "estado_incidente": "resuelto", "fecha_incidente": null}),
            ],
            rentals: Some(vec![json!({"id": 1, "cliente": "Ana"})]),
            failing_deletes: HashSet::new(),
            seen: Vec::new(),
            next_id: 100,
        }
    }
}

pub type Shared = Arc<Mutex<Data>>;

pub struct StubBackend {
    pub port: u16,
    /// API base, ending in `/api/`
    pub base_url: String,
    pub data: Shared,
}

impl StubBackend {
    pub async fn spawn(data: Data) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/api/", port);
        let data: Shared = Arc::new(Mutex::new(data));

        let app = Router::new().fallback(dispatch).with_state(data.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind stub backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, data })
    }

    pub async fn seeded() -> Result<Self> {
        Self::spawn(Data::seeded()).await
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(&self.base_url)
    }

    /// Client signing every request with the token the stub accepts
    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::http(&self.config(), Arc::new(StaticToken(TOKEN.to_string())))?)
    }

    pub fn data(&self) -> std::sync::MutexGuard<'_, Data> {
        self.data.lock().unwrap()
    }

    pub fn seen(&self, method: Method, path: &str) -> Vec<Seen> {
        self.data()
            .seen
            .iter()
            .filter(|s| s.method == method && s.path == path)
            .cloned()
            .collect()
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, json!({"detail": "No encontrado."}))
}

async fn dispatch(State(data): State<Shared>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let path = uri.path().trim_start_matches("/api/").to_string();
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body: Option<Value> = serde_json::from_slice(&body).ok();

    let mut data = data.lock().unwrap();
    data.seen.push(Seen {
        method: method.clone(),
        path: path.clone(),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    let public = matches!(path.as_str(), "login/" | "groups/");
    let expected = format!("Bearer {}", TOKEN);
    if !public && authorization.as_deref() != Some(expected.as_str()) {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Las credenciales de autenticación no se proveyeron."}),
        );
    }

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let body = body.unwrap_or(Value::Null);

    match (method, segments.as_slice()) {
        (Method::POST, ["login"]) => {
            if body["password"] == json!(PASSWORD) {
                reply(
                    StatusCode::OK,
                    json!({"access": TOKEN, "refresh": "refresh-token", "username": body["username"], "roles": ["Admin"]}),
                )
            } else {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({"detail": "No active account found with the given credentials"}),
                )
            }
        }
        (Method::GET, ["users", "me"]) => reply(StatusCode::OK, data.me.clone()),
        (Method::GET, ["groups"]) => reply(StatusCode::OK, json!(data.groups)),

        (Method::GET, ["employees"]) => reply(StatusCode::OK, json!(data.employees)),
        (Method::POST, ["users", "create", "employee"]) => {
            let taken = data.employees.iter().any(|e| e["username"] == body["username"]);
            if taken {
                return reply(
                    StatusCode::BAD_REQUEST,
                    json!({"username": ["Ya existe un usuario con este nombre."]}),
                );
            }
            let mut record = body.clone();
            let id = data.next_id();
            record["id"] = json!(id);
            record["id_empleados"] = json!(id + 1000);
            data.employees.push(record.clone());
            reply(StatusCode::CREATED, record)
        }
        (Method::GET, ["employees", id]) => find(&data.employees, "id", id),
        // The detail view is keyed by the employee profile id, not the user id
        (Method::GET, ["employees-detail", id]) => find(&data.employees, "id_empleados", id),
        (Method::PUT, ["employees", id]) => update(&mut data.employees, "id", id, body),
        (Method::DELETE, ["employees", id]) => {
            let path = path.clone();
            remove(&mut data, Table::Employees, "id", id, &path)
        }
        (Method::PATCH, ["employees-detail", id, "inactivar"]) => {
            update(&mut data.employees, "id", id, json!({"is_active": false}))
        }

        (Method::GET, ["productos"]) => reply(StatusCode::OK, json!(data.products)),
        (Method::POST, ["productos"]) => {
            let mut record = body.clone();
            record["id_productos"] = json!(data.next_id());
            data.products.push(record.clone());
            reply(StatusCode::CREATED, record)
        }
        (Method::GET, ["productos", id]) => find(&data.products, "id_productos", id),
        (Method::PUT, ["productos", id]) => update(&mut data.products, "id_productos", id, body),
        (Method::DELETE, ["productos", id]) => {
            let path = path.clone();
            remove(&mut data, Table::Products, "id_productos", id, &path)
        }
        (Method::GET, ["categorias"]) => reply(StatusCode::OK, json!(data.categories)),

        (Method::GET, ["incidentes"]) => reply(StatusCode::OK, json!(data.incidents)),
        (Method::POST, ["incidentes", "create"]) => {
            if body["descripcion"].as_str().map(str::is_empty).unwrap_or(true) {
                return reply(
                    StatusCode::BAD_REQUEST,
                    json!({"descripcion": ["Este campo es requerido."]}),
                );
            }
            let mut record = body.clone();
            record["id"] = json!(data.next_id());
            data.incidents.push(record.clone());
            reply(StatusCode::CREATED, record)
        }
        (Method::GET, ["incidentes", id]) => find(&data.incidents, "id", id),
        (Method::PUT, ["incidentes", id]) => update(&mut data.incidents, "id", id, body),
        (Method::DELETE, ["incidentes", id, "delete"]) => {
            let path = path.clone();
            remove(&mut data, Table::Incidents, "id", id, &path)
        }
        (Method::GET, ["alquileres"]) => match &data.rentals {
            Some(rentals) => reply(StatusCode::OK, json!(rentals)),
            None => reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "Error interno."})),
        },

        _ => not_found(),
    }
}

#[derive(Clone, Copy)]
enum Table {
    Employees,
    Products,
    Incidents,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn table(&mut self, table: Table) -> &mut Vec<Value> {
        match table {
            Table::Employees => &mut self.employees,
            Table::Products => &mut self.products,
            Table::Incidents => &mut self.incidents,
        }
    }
}

fn matches_id(record: &Value, id_field: &str, id: &str) -> bool {
    match &record[id_field] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

fn find(records: &[Value], id_field: &str, id: &str) -> Response {
    match records.iter().find(|r| matches_id(r, id_field, id)) {
        Some(record) => reply(StatusCode::OK, record.clone()),
        None => not_found(),
    }
}

fn update(records: &mut [Value], id_field: &str, id: &str, changes: Value) -> Response {
    let Some(record) = records.iter_mut().find(|r| matches_id(r, id_field, id)) else {
        return not_found();
    };
    if let (Some(record), Value::Object(changes)) = (record.as_object_mut(), changes) {
        record.extend(changes);
    }
    reply(StatusCode::OK, record.clone())
}

fn remove(
    data: &mut Data,
    table: Table,
    id_field: &str,
    id: &str,
    path: &str,
) -> Response {
    if data.failing_deletes.contains(path) {
        return reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "Error interno."}));
    }
    let records = data.table(table);
    let before = records.len();
    records.retain(|r| !matches_id(r, id_field, id));
    if records.len() == before {
        return not_found();
    }
    StatusCode::NO_CONTENT.into_response()
}
