use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Username of the default administrator account that can never be
/// selected, deleted or inactivated from the client.
pub const DEFAULT_PROTECTED_USERNAME: &str = "briadmin";

/// Development default. Staging and production have none and need
/// `TIENDA_API_URL`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub guard: GuardConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto; always ends with `/`.
    /// Empty when the environment has no default and none was configured.
    pub base_url: String,
    pub enable_request_logging: bool,
    pub require_https: bool,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub protected_username: String,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TIENDA_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = normalize_base_url(&v);
            }
        }
        if let Ok(v) = env::var("TIENDA_LOG_REQUESTS") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("TIENDA_REQUIRE_HTTPS") {
            self.api.require_https = v.parse().unwrap_or(self.api.require_https);
        }
        if let Ok(v) = env::var("TIENDA_PROTECTED_USERNAME") {
            let v = v.trim();
            if !v.is_empty() {
                self.guard.protected_username = v.to_string();
            }
        }

        self
    }

    /// Build a config pointing at an explicit base URL, keeping development defaults
    pub fn with_base_url(base_url: &str) -> Self {
        let mut config = Self::development();
        config.api.base_url = normalize_base_url(base_url);
        config
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                enable_request_logging: true,
                require_https: false,
                user_agent: user_agent(),
            },
            guard: GuardConfig {
                protected_username: DEFAULT_PROTECTED_USERNAME.to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: String::new(),
                enable_request_logging: true,
                require_https: true,
                user_agent: user_agent(),
            },
            guard: GuardConfig {
                protected_username: DEFAULT_PROTECTED_USERNAME.to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: String::new(),
                enable_request_logging: false,
                require_https: true,
                user_agent: user_agent(),
            },
            guard: GuardConfig {
                protected_username: DEFAULT_PROTECTED_USERNAME.to_string(),
            },
        }
    }
}

fn user_agent() -> String {
    format!("tienda-admin/{}", env!("CARGO_PKG_VERSION"))
}

/// Resource paths are relative (`employees/`), so the base must end in `/`
/// for URL joining to keep its last segment.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
