pub mod claims;
pub mod store;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::resource::RecordId;

pub use claims::{inspect_token, Claims};
pub use store::{StoredCredentials, TokenStore};

pub const LOGIN_PATH: &str = "login/";
pub const CURRENT_USER_PATH: &str = "users/me/";

/// Source of the bearer credential, consulted at the moment of each request.
pub trait CredentialProvider: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// No credential at all; requests go out unauthenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredential;

impl CredentialProvider for NoCredential {
    fn current_token(&self) -> Option<String> {
        None
    }
}

/// Fixed in-memory token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn current_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// The authenticated user as reported by `users/me/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<Value>,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl CurrentUser {
    pub fn record_id(&self) -> Option<RecordId> {
        self.id.as_ref().and_then(RecordId::from_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

pub async fn fetch_current_user(api: &ApiClient) -> Result<CurrentUser, ClientError> {
    let body = api.get(CURRENT_USER_PATH).await?;
    Ok(serde_json::from_value(body)?)
}

/// Like `fetch_current_user`, but a missing endpoint (404) is not an error.
pub async fn fetch_current_user_optional(api: &ApiClient) -> Result<Option<CurrentUser>, ClientError> {
    match fetch_current_user(api).await {
        Ok(user) => Ok(Some(user)),
        Err(ClientError::Rejected { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Exchange username and password for a token pair. Sent without credentials.
pub async fn login(api: &ApiClient, username: &str, password: &str) -> Result<LoginResponse, ClientError> {
    let body = api
        .post_public(LOGIN_PATH, json!({ "username": username, "password": password }))
        .await?;
    let response: LoginResponse = serde_json::from_value(body)?;
    tracing::info!(username = %response.username, "Logged in");
    Ok(response)
}
