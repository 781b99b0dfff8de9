use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::TokenStore;
use crate::client::ApiClient;
use crate::config::config;

/// CLI state directory: `TIENDA_CLI_CONFIG_DIR`, else `~/.config/tienda/cli`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("TIENDA_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("tienda").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn token_store() -> anyhow::Result<TokenStore> {
    Ok(TokenStore::new(get_config_dir()?.join("auth.json")))
}

/// HTTP client against the configured API, signing requests with the stored token
pub fn build_api() -> anyhow::Result<ApiClient> {
    let store = token_store()?;
    Ok(ApiClient::http(config(), Arc::new(store))?)
}
