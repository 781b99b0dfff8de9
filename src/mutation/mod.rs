//! Create/edit form state and the destructive actions that follow a list.

pub mod actions;
pub mod draft;

use serde_json::Value;

use crate::client::{ApiClient, ApiRequest, HttpMethod};
use crate::error::{ClientError, TRY_AGAIN_MESSAGE};
use crate::list::ListController;
use crate::resource::record::scalar_text;
use crate::resource::{ErrorStyle, RecordId, ResourceRecord, ResourceSpec};

pub use actions::{cleanup_incomplete, delete_record, delete_selected, toggle_status, ActionOutcome};
pub use draft::{Draft, FieldValue};

#[derive(Debug, Clone, PartialEq)]
pub enum MutationState {
    Idle,
    Submitting,
    /// Carries the server's response body
    Success(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Update(RecordId),
}

/// Form controller: `Idle -> Submitting -> Success`, or back to `Idle` when
/// the submit fails.
///
/// A failed submit keeps its message in `last_error` until the next
/// successful one.
#[derive(Debug, Clone)]
pub struct MutationController {
    api: ApiClient,
    spec: &'static ResourceSpec,
    mode: SubmitMode,
    draft: Draft,
    state: MutationState,
    last_error: Option<String>,
}

impl MutationController {
    pub fn new_create(api: ApiClient, spec: &'static ResourceSpec) -> Self {
        Self {
            api,
            spec,
            mode: SubmitMode::Create,
            draft: Draft::blank(spec),
            state: MutationState::Idle,
            last_error: None,
        }
    }

    /// Load the record and pre-fill an edit draft from it
    pub async fn edit(api: ApiClient, spec: &'static ResourceSpec, id: RecordId) -> Result<Self, ClientError> {
        let mut request = ApiRequest::new(HttpMethod::Get, spec.item_path_for(&id));
        request.authenticated = spec.authenticated;
        let record = ResourceRecord::from_value(api.execute(request).await?)?;

        Ok(Self {
            api,
            spec,
            mode: SubmitMode::Update(id),
            draft: Draft::from_record(spec, &record),
            state: MutationState::Idle,
            last_error: None,
        })
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn state(&self) -> &MutationState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), ClientError> {
        self.draft.set(name, value)
    }

    pub fn set_flag(&mut self, name: &str, flag: bool) -> Result<(), ClientError> {
        self.draft.set_flag(name, flag)
    }

    /// Send the complete draft. Missing required fields fail locally without
    /// a request.
    pub async fn submit(&mut self) -> Result<Value, ClientError> {
        if let Some(field) = self.draft.missing_required().first() {
            let err = ClientError::MissingRequiredField(field.to_string());
            self.fail(err.to_string());
            return Err(err);
        }

        self.state = MutationState::Submitting;
        let payload = self.draft.payload();
        let request = match &self.mode {
            SubmitMode::Create => ApiRequest::new(HttpMethod::Post, self.spec.create_path),
            SubmitMode::Update(id) => ApiRequest::new(HttpMethod::Put, self.spec.item_path_for(id)),
        };
        let mut request = request.with_body(payload);
        request.authenticated = self.spec.authenticated;

        match self.api.execute(request).await {
            Ok(body) => {
                tracing::info!(resource = self.spec.name, mode = ?self.mode, "Record saved");
                if self.mode == SubmitMode::Create {
                    self.draft.reset();
                }
                self.last_error = None;
                self.state = MutationState::Success(body.clone());
                Ok(body)
            }
            Err(e) => {
                let message = failure_message(&e, self.spec.error_style);
                tracing::warn!(resource = self.spec.name, error = %e, %message, "Save failed");
                self.fail(message);
                Err(e)
            }
        }
    }

    /// Submit, then refresh the list so it includes the saved record. Once
    /// the server has accepted the write, a failed refresh is only logged.
    pub async fn submit_and_reload(&mut self, list: &mut ListController) -> Result<Value, ClientError> {
        let body = self.submit().await?;
        actions::reload(list).await;
        Ok(body)
    }

    fn fail(&mut self, message: String) {
        self.last_error = Some(message);
        self.state = MutationState::Idle;
    }
}

/// Message for a failed operation: the server payload when there is one,
/// otherwise the error's own message.
pub fn failure_message(err: &ClientError, style: ErrorStyle) -> String {
    match err {
        ClientError::Network(_) => TRY_AGAIN_MESSAGE.to_string(),
        _ => match err.body() {
            Some(body) => extract_error_message(body, style),
            None => err.to_string(),
        },
    }
}

/// Turn a validation payload into one message.
///
/// `FirstKnown` takes the first listed field present (first element when it
/// is an array). `JoinAll` renders every entry as `field: msg1, msg2`, one per
/// line. Anything unrecognised falls back to `detail`, then to the JSON dump.
pub fn extract_error_message(body: &Value, style: ErrorStyle) -> String {
    let map = match body {
        Value::Null => return TRY_AGAIN_MESSAGE.to_string(),
        Value::String(text) => return text.clone(),
        Value::Object(map) if !map.is_empty() => map,
        other => return other.to_string(),
    };

    let found = match style {
        ErrorStyle::FirstKnown(fields) => fields
            .iter()
            .find_map(|field| map.get(*field).and_then(first_message)),
        ErrorStyle::JoinAll => Some(
            map.iter()
                .map(|(field, messages)| format!("{}: {}", field, all_messages(messages)))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    };

    found
        .or_else(|| map.get("detail").and_then(first_message))
        .unwrap_or_else(|| body.to_string())
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.first().map(message_text),
        Value::Null => None,
        other => Some(message_text(other)),
    }
}

fn all_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(message_text).collect::<Vec<_>>().join(", "),
        other => message_text(other),
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => value.to_string(),
        scalar => scalar_text(scalar),
    }
}
