use clap::Subcommand;

use crate::cli::config::build_api;
use crate::cli::utils::{output_empty_collection, output_error};
use crate::cli::OutputFormat;
use crate::resource::catalog::GROUPS;
use crate::resource::ResourceRecord;

#[derive(Subcommand)]
pub enum GroupCommands {
    #[command(about = "List groups that can be assigned to employees")]
    List,
}

pub async fn handle(cmd: GroupCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        GroupCommands::List => {
            let api = build_api()?;
            let groups = match api.get_public(GROUPS.path).await.and_then(ResourceRecord::collection) {
                Ok(groups) => groups,
                Err(e) => {
                    let message = e.user_message();
                    output_error(&output_format, &message, Some(e.error_code()))?;
                    return Err(anyhow::anyhow!(message));
                }
            };

            if groups.is_empty() {
                return output_empty_collection(&output_format, "groups", "No groups found");
            }

            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "groups": groups }))?);
                }
                OutputFormat::Text => {
                    for group in &groups {
                        let id = group.id(&["id", "pk"]).map(|id| id.to_string()).unwrap_or_default();
                        println!("{:>4}  {}", id, group.text("name"));
                    }
                }
            }
            Ok(())
        }
    }
}
