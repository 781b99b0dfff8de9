// Client-side error types
use serde_json::Value;

use crate::gate::GuardRefusal;

/// Message shown when no response was received at all.
pub const TRY_AGAIN_MESSAGE: &str = "Por favor, intenta nuevamente.";

/// Every failure an operation can raise. Nothing here is fatal to the process;
/// each error is scoped to the operation that produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    // No response received (connection refused, DNS, TLS, reset)
    #[error("network error: {0}")]
    Network(String),

    // 401 / 403: absent, expired or invalid credential
    #[error("not authorized (HTTP {status})")]
    Unauthorized { status: u16, body: Value },

    // Any other non-success status, usually 400 with field errors
    #[error("request rejected (HTTP {status})")]
    Rejected { status: u16, body: Value },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    // Client-side required-field enforcement; never reaches the network
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    #[error("unknown field '{field}' for {resource}")]
    UnknownField { resource: &'static str, field: String },

    #[error("no records selected")]
    EmptySelection,

    #[error("no {resource} with id {id}")]
    UnknownRecord { resource: &'static str, id: String },

    #[error("{resource} does not support {action}")]
    Unsupported { resource: &'static str, action: &'static str },

    // Protected-account or self-action refusal; never reaches the network
    #[error("{0}")]
    Guard(GuardRefusal),
}

impl ClientError {
    /// HTTP status when the server answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Rejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Server error payload, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::Unauthorized { body, .. } | ClientError::Rejected { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    /// Stable code for JSON output and scripting
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Unauthorized { .. } => "UNAUTHORIZED",
            ClientError::Rejected { status, .. } if *status == 404 => "NOT_FOUND",
            ClientError::Rejected { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Rejected { .. } => "VALIDATION_ERROR",
            ClientError::InvalidUrl(_) => "INVALID_URL",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
            ClientError::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            ClientError::UnknownField { .. } => "UNKNOWN_FIELD",
            ClientError::EmptySelection => "EMPTY_SELECTION",
            ClientError::UnknownRecord { .. } => "UNKNOWN_RECORD",
            ClientError::Unsupported { .. } => "UNSUPPORTED",
            ClientError::Guard(GuardRefusal::Protected { .. }) => "PROTECTED_ACCOUNT",
            ClientError::Guard(GuardRefusal::SelfAction { .. }) => "SELF_ACTION",
        }
    }

    /// True when the failure was decided client-side without a request
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::MissingRequiredField(_)
                | ClientError::UnknownField { .. }
                | ClientError::EmptySelection
                | ClientError::UnknownRecord { .. }
                | ClientError::Unsupported { .. }
                | ClientError::Guard(_)
        )
    }

    /// Human-readable message for a blocking notice.
    ///
    /// Server payloads are searched for `detail` then `error`; transport
    /// failures get the generic retry message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => TRY_AGAIN_MESSAGE.to_string(),
            ClientError::Unauthorized { body, .. } | ClientError::Rejected { body, .. } => {
                ["detail", "error"]
                    .iter()
                    .find_map(|key| body.get(key).and_then(Value::as_str))
                    .map(str::to_string)
                    .unwrap_or_else(|| TRY_AGAIN_MESSAGE.to_string())
            }
            other => other.to_string(),
        }
    }
}

impl From<GuardRefusal> for ClientError {
    fn from(refusal: GuardRefusal) -> Self {
        ClientError::Guard(refusal)
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() || err.is_body() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}
