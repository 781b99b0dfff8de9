use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::CredentialProvider;

/// Persisted client storage: what a successful login leaves behind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub username: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

/// File-backed credential store.
///
/// The file is re-read on every `current_token()` call, so a login or logout
/// from another process is picked up by the next request.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<StoredCredentials> {
        if !self.path.exists() {
            return Ok(StoredCredentials::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let credentials: StoredCredentials = serde_json::from_str(&content)?;
        Ok(credentials)
    }

    pub fn save(&self, credentials: &StoredCredentials) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Store the result of a login, replacing whatever was there
    pub fn store_login(&self, access: &str, refresh: Option<&str>, username: &str) -> anyhow::Result<()> {
        self.save(&StoredCredentials {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
            username: Some(username.to_string()),
            saved_at: Some(Utc::now()),
        })
    }

    /// Remove access token, refresh token and username
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl CredentialProvider for TokenStore {
    fn current_token(&self) -> Option<String> {
        match self.load() {
            Ok(credentials) => credentials.access_token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!("Could not read credential store {}: {}", self.path.display(), e);
                None
            }
        }
    }
}
