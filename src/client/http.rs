use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::{ApiRequest, HttpMethod, Transport};
use crate::auth::CredentialProvider;
use crate::config::ClientConfig;
use crate::error::ClientError;

/// Transport over reqwest. The credential provider is asked for a token on
/// every request; nothing is cached here.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
    log_requests: bool,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, ClientError> {
        if config.api.base_url.trim().is_empty() {
            return Err(ClientError::InvalidUrl(format!(
                "no API base URL configured for {:?}; set TIENDA_API_URL",
                config.environment
            )));
        }
        let base_url = Url::parse(&config.api.base_url)?;
        if config.api.require_https && base_url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "{} is not an https URL",
                config.api.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(config.api.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url,
            credentials,
            log_requests: config.api.enable_request_logging,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let url = self.url_for(&request.path)?;

        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(url.clone()),
            HttpMethod::Post => self.http.post(url.clone()),
            HttpMethod::Put => self.http.put(url.clone()),
            HttpMethod::Patch => self.http.patch(url.clone()),
            HttpMethod::Delete => self.http.delete(url.clone()),
        };

        if request.authenticated {
            if let Some(token) = self.credentials.current_token() {
                builder = builder.bearer_auth(token);
            }
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if self.log_requests {
            tracing::debug!(method = %request.method, %url, "Sending request");
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        if status.is_success() {
            return Ok(body);
        }

        tracing::debug!(method = %request.method, %url, status = status.as_u16(), "Request failed");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized {
                status: status.as_u16(),
                body,
            }),
            _ => Err(ClientError::Rejected {
                status: status.as_u16(),
                body,
            }),
        }
    }
}

/// Empty bodies become `Null`; non-JSON bodies (HTML error pages) are kept as text.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
