//! Confirmation before destructive actions, with the protected-account and
//! self-action guards evaluated first.

use async_trait::async_trait;
use std::fmt;
use std::future::Future;

use crate::auth::CurrentUser;
use crate::resource::{RecordId, ResourceRecord, ResourceSpec};

/// Why the client refused an action without asking the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardRefusal {
    Protected { username: String },
    SelfAction { username: String },
}

impl fmt::Display for GuardRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardRefusal::Protected { username } => {
                write!(f, "Protected account: '{}' cannot be modified or deleted", username)
            }
            GuardRefusal::SelfAction { username } => {
                write!(f, "You cannot act on your own account ('{}') while logged in", username)
            }
        }
    }
}

/// Protected-account and self-action checks. The acting user is passed in
/// explicitly rather than read from ambient state.
#[derive(Debug, Clone)]
pub struct Guard {
    protected_username: String,
    current_username: Option<String>,
}

impl Guard {
    pub fn new(protected_username: impl Into<String>, current_user: Option<&CurrentUser>) -> Self {
        Self {
            protected_username: protected_username.into(),
            current_username: current_user.map(|user| user.username.clone()),
        }
    }

    pub fn protected_username(&self) -> &str {
        &self.protected_username
    }

    pub fn check_username(&self, username: &str) -> Result<(), GuardRefusal> {
        if username == self.protected_username {
            return Err(GuardRefusal::Protected {
                username: username.to_string(),
            });
        }
        if self.current_username.as_deref() == Some(username) {
            return Err(GuardRefusal::SelfAction {
                username: username.to_string(),
            });
        }
        Ok(())
    }

    /// Records of unguarded entities, or without a username, always pass
    pub fn check(&self, spec: &ResourceSpec, record: &ResourceRecord) -> Result<(), GuardRefusal> {
        match spec.identity(record) {
            Some(username) => self.check_username(username),
            None => Ok(()),
        }
    }

    pub fn allows(&self, spec: &ResourceSpec, record: &ResourceRecord) -> bool {
        self.check(spec, record).is_ok()
    }
}

/// Yes/no question shown before a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub consequence: String,
    pub confirm_label: String,
}

impl Prompt {
    pub fn delete(label: &str, title: &str) -> Self {
        Self {
            title: format!("Delete {} \"{}\"?", label, title),
            consequence: "This action cannot be undone.".to_string(),
            confirm_label: "Yes, delete".to_string(),
        }
    }

    pub fn delete_many(label: &str, count: usize) -> Self {
        Self {
            title: format!("Delete {} selected {}(s)?", count, label),
            consequence: format!("{} record(s) will be deleted. This action cannot be undone.", count),
            confirm_label: "Yes, delete".to_string(),
        }
    }

    pub fn inactivate(label: &str, title: &str) -> Self {
        Self {
            title: format!("Inactivate {} \"{}\"?", label, title),
            consequence: "The account will no longer be able to access the system.".to_string(),
            confirm_label: "Yes, inactivate".to_string(),
        }
    }
}

#[async_trait]
pub trait Prompter: Send + Sync {
    async fn confirm(&self, prompt: &Prompt) -> bool;
}

/// Answers every prompt the same way (`--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct AutoAnswer(pub bool);

#[async_trait]
impl Prompter for AutoAnswer {
    async fn confirm(&self, _prompt: &Prompt) -> bool {
        self.0
    }
}

pub struct ConfirmationGate<'a> {
    guard: &'a Guard,
    prompter: &'a dyn Prompter,
}

impl<'a> ConfirmationGate<'a> {
    pub fn new(guard: &'a Guard, prompter: &'a dyn Prompter) -> Self {
        Self { guard, prompter }
    }

    pub fn guard(&self) -> &Guard {
        self.guard
    }

    /// Guards first; the prompt is only shown when both pass.
    pub async fn confirm(
        &self,
        spec: &ResourceSpec,
        record: &ResourceRecord,
        prompt: &Prompt,
    ) -> Result<bool, GuardRefusal> {
        if let Err(refusal) = self.guard.check(spec, record) {
            tracing::warn!(resource = spec.name, %refusal, "Action refused by guard");
            return Err(refusal);
        }
        Ok(self.prompter.confirm(prompt).await)
    }

    /// One prompt for a whole batch; per-record guards were applied when the
    /// selection was built.
    pub async fn confirm_batch(&self, prompt: &Prompt) -> bool {
        self.prompter.confirm(prompt).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: RecordId,
    pub message: String,
}

/// Result of a sequential batch: every item ends up in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub succeeded: Vec<RecordId>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn summary(&self) -> String {
        if self.failed.is_empty() {
            format!("{} deleted successfully.", self.succeeded.len())
        } else {
            format!(
                "{} deleted successfully. {} failed.",
                self.succeeded.len(),
                self.failed.len()
            )
        }
    }
}

/// Run `op` over `ids` one at a time, folding each result into the outcome.
/// A failure never stops the remaining items.
pub async fn run_sequential<F, Fut, E>(ids: Vec<RecordId>, mut op: F) -> BatchOutcome
where
    F: FnMut(RecordId) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    let mut outcome = BatchOutcome::default();
    for id in ids {
        match op(id.clone()).await {
            Ok(()) => outcome.succeeded.push(id),
            Err(e) => {
                tracing::warn!(%id, error = %e, "Batch item failed");
                outcome.failed.push(BatchFailure {
                    id,
                    message: e.to_string(),
                });
            }
        }
    }
    outcome
}
