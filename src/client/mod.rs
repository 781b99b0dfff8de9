pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::auth::CredentialProvider;
use crate::config::ClientConfig;
use crate::error::ClientError;

pub use http::HttpTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// One outgoing call, path relative to the API base (`employees/7/`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
    /// Whether the bearer credential should be attached (when one exists)
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            authenticated: true,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Executes requests. A response body that is empty decodes as `Value::Null`.
///
/// No retry and no timeout: a single failed call fails the operation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError>;
}

/// Cheap-to-clone handle over a transport with the verb helpers the
/// controllers use.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// reqwest-backed client for the configured base URL
    pub fn http(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config, credentials)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.transport.execute(request).await
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Get, path)).await
    }

    pub async fn get_public(&self, path: &str) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Get, path).public()).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Post, path).with_body(body)).await
    }

    pub async fn post_public(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Post, path).with_body(body).public())
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Put, path).with_body(body)).await
    }

    pub async fn patch(&self, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let mut request = ApiRequest::new(HttpMethod::Patch, path);
        request.body = body;
        self.execute(request).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.execute(ApiRequest::new(HttpMethod::Delete, path)).await
    }
}
