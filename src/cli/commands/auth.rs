use chrono::Utc;
use clap::Subcommand;
use serde_json::json;

use crate::auth::{self, inspect_token};
use crate::cli::config::{build_api, token_store};
use crate::cli::utils::{output_error, output_success, read_line};
use crate::cli::OutputFormat;
use crate::resource::catalog::NO_ROLE;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => read_line("Password").await?,
            };

            let api = build_api()?;
            let response = match auth::login(&api, &username, &password).await {
                Ok(response) => response,
                Err(e) => {
                    let message = e.user_message();
                    output_error(&output_format, &message, Some(e.error_code()))?;
                    return Err(anyhow::anyhow!(message));
                }
            };

            token_store()?.store_login(&response.access, response.refresh.as_deref(), &response.username)?;
            output_success(
                &output_format,
                &format!("Logged in as {}", response.username),
                Some(json!({ "username": response.username, "roles": response.roles })),
            )
        }
        AuthCommands::Logout => {
            token_store()?.clear()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let stored = token_store()?.load()?;
            let Some(token) = stored.access_token.filter(|t| !t.trim().is_empty()) else {
                return output_success(&output_format, "Not logged in", Some(json!({ "authenticated": false })));
            };

            let expires_at = match inspect_token(&token) {
                Ok(claims) => claims.expires_at(),
                Err(e) => {
                    tracing::debug!(error = %e, "Stored token is not a readable JWT");
                    None
                }
            };
            let expired = expires_at.map(|at| at <= Utc::now()).unwrap_or(false);
            let username = stored.username.unwrap_or_default();

            let message = match (expired, expires_at) {
                (true, _) => format!("Token for {} has expired; log in again", username),
                (false, Some(at)) => format!("Logged in as {} (token expires {})", username, at.to_rfc3339()),
                (false, None) => format!("Logged in as {}", username),
            };
            output_success(
                &output_format,
                &message,
                Some(json!({
                    "authenticated": !expired,
                    "username": username,
                    "expires_at": expires_at.map(|at| at.to_rfc3339()),
                    "saved_at": stored.saved_at.map(|at| at.to_rfc3339()),
                })),
            )
        }
        AuthCommands::Whoami => {
            let api = build_api()?;
            let user = match auth::fetch_current_user(&api).await {
                Ok(user) => user,
                Err(e) => {
                    let message = e.user_message();
                    output_error(&output_format, &message, Some(e.error_code()))?;
                    return Err(anyhow::anyhow!(message));
                }
            };

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&user)?);
                }
                OutputFormat::Text => {
                    let roles = if user.roles.is_empty() {
                        NO_ROLE.to_string()
                    } else {
                        user.roles.join(", ")
                    };
                    println!("Username: {}", user.username);
                    if let Some(id) = user.record_id() {
                        println!("ID: {}", id);
                    }
                    println!("Roles: {}", roles);
                }
            }
            Ok(())
        }
    }
}
