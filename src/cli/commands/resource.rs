use clap::Subcommand;
use serde_json::json;

use crate::auth::fetch_current_user;
use crate::cli::config::build_api;
use crate::cli::utils::{output_batch, output_record, output_records, output_success, parse_assignments, prompter, report};
use crate::cli::OutputFormat;
use crate::client::ApiClient;
use crate::config::config;
use crate::error::ClientError;
use crate::gate::{ConfirmationGate, Guard};
use crate::list::ListController;
use crate::mutation::{self, ActionOutcome, MutationController};
use crate::resource::catalog::EMPLOYEES;
use crate::resource::{RecordId, ResourceRecord, ResourceSpec};

/// Commands every resource supports
#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List every record")]
    List,

    #[command(about = "Case-insensitive search over the searchable fields")]
    Search {
        #[arg(help = "Search term (an empty term matches nothing)")]
        term: String,
    },

    #[command(about = "Show one record")]
    Show {
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create a record from --set FIELD=VALUE pairs")]
    Create {
        #[arg(long, value_name = "FIELD=VALUE", help = "Field value (repeatable)")]
        set: Vec<String>,
    },

    #[command(about = "Update a record; unset fields keep their current value")]
    Update {
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, value_name = "FIELD=VALUE", help = "Field value (repeatable)")]
        set: Vec<String>,
    },

    #[command(about = "Delete a record after confirmation")]
    Delete {
        #[arg(help = "Record ID")]
        id: String,
        #[arg(long, short = 'y', help = "Answer yes to the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Delete several records with one confirmation")]
    DeleteMany {
        #[arg(required = true, help = "Record IDs")]
        ids: Vec<String>,
        #[arg(long, short = 'y', help = "Answer yes to the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum EmployeeCommands {
    #[command(flatten)]
    Common(ResourceCommands),

    #[command(about = "List employees missing name, phone or address")]
    Incomplete,

    #[command(about = "Delete every incomplete employee after one confirmation")]
    Cleanup {
        #[arg(long, short = 'y', help = "Answer yes to the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Inactivate an employee account")]
    Inactivate {
        #[arg(help = "Employee ID")]
        id: String,
        #[arg(long, short = 'y', help = "Answer yes to the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle_employees(cmd: EmployeeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let spec = &EMPLOYEES;
    match cmd {
        EmployeeCommands::Common(cmd) => handle(cmd, spec, output_format).await,
        EmployeeCommands::Incomplete => {
            let list = loaded_list(build_api()?, spec, &output_format).await?;
            let records: Vec<&ResourceRecord> = list.incomplete().iter().collect();
            output_records(&output_format, spec, &records, list.relation_collection())
        }
        EmployeeCommands::Cleanup { yes } => {
            let api = build_api()?;
            let guard = acting_guard(&api, spec, &output_format).await?;
            let prompter = prompter(yes);
            let gate = ConfirmationGate::new(&guard, prompter.as_ref());
            let mut list = loaded_list(api, spec, &output_format).await?;

            match mutation::cleanup_incomplete(&mut list, &gate).await {
                Ok(Some(outcome)) => output_batch(&output_format, &outcome),
                Ok(None) => output_success(&output_format, "Cleanup cancelled", None),
                Err(ClientError::EmptySelection) => {
                    output_success(&output_format, "No incomplete employees to clean up", None)
                }
                Err(e) => Err(report(&output_format, spec, e)),
            }
        }
        EmployeeCommands::Inactivate { id, yes } => {
            let api = build_api()?;
            let guard = acting_guard(&api, spec, &output_format).await?;
            let prompter = prompter(yes);
            let gate = ConfirmationGate::new(&guard, prompter.as_ref());
            let mut list = ListController::new(api, spec);
            let id = RecordId::from(id);

            match mutation::toggle_status(&mut list, &gate, &id).await {
                Ok(ActionOutcome::Completed) => output_success(
                    &output_format,
                    &format!("Employee {} inactivated", id),
                    Some(json!({ "id": id.to_value() })),
                ),
                Ok(ActionOutcome::Declined) => output_success(&output_format, "Inactivation cancelled", None),
                Err(e) => Err(report(&output_format, spec, e)),
            }
        }
    }
}

pub async fn handle(
    cmd: ResourceCommands,
    spec: &'static ResourceSpec,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ResourceCommands::List => {
            let list = loaded_list(build_api()?, spec, &output_format).await?;
            let records: Vec<&ResourceRecord> = list.records().iter().collect();
            output_records(&output_format, spec, &records, list.relation_collection())
        }
        ResourceCommands::Search { term } => {
            let list = loaded_list(build_api()?, spec, &output_format).await?;
            output_records(&output_format, spec, &list.search(&term), list.relation_collection())
        }
        ResourceCommands::Show { id } => {
            let list = ListController::new(build_api()?, spec);
            let record = list
                .fetch_detail(&RecordId::from(id))
                .await
                .map_err(|e| report(&output_format, spec, e))?;
            output_record(&output_format, &record)
        }
        ResourceCommands::Create { set } => {
            let assignments = parse_assignments(&set)?;
            let mut form = MutationController::new_create(build_api()?, spec);
            submit(&mut form, &assignments, &output_format).await
        }
        ResourceCommands::Update { id, set } => {
            let assignments = parse_assignments(&set)?;
            let mut form = MutationController::edit(build_api()?, spec, RecordId::from(id))
                .await
                .map_err(|e| report(&output_format, spec, e))?;
            submit(&mut form, &assignments, &output_format).await
        }
        ResourceCommands::Delete { id, yes } => {
            let api = build_api()?;
            let guard = acting_guard(&api, spec, &output_format).await?;
            let prompter = prompter(yes);
            let gate = ConfirmationGate::new(&guard, prompter.as_ref());
            let mut list = loaded_list(api, spec, &output_format).await?;
            let id = RecordId::from(id);

            match mutation::delete_record(&mut list, &gate, &id).await {
                Ok(ActionOutcome::Completed) => output_success(
                    &output_format,
                    &format!("Deleted {} {}", spec.label, id),
                    Some(json!({ "id": id.to_value() })),
                ),
                Ok(ActionOutcome::Declined) => output_success(&output_format, "Delete cancelled", None),
                Err(e) => Err(report(&output_format, spec, e)),
            }
        }
        ResourceCommands::DeleteMany { ids, yes } => {
            let api = build_api()?;
            let guard = acting_guard(&api, spec, &output_format).await?;
            let prompter = prompter(yes);
            let gate = ConfirmationGate::new(&guard, prompter.as_ref());
            let mut list = loaded_list(api, spec, &output_format).await?;

            for id in ids {
                let id = RecordId::from(id);
                if list.selection().contains(&id) {
                    continue;
                }
                list.toggle_selected(&id, &guard)
                    .map_err(|e| report(&output_format, spec, e))?;
            }

            match mutation::delete_selected(&mut list, &gate).await {
                Ok(Some(outcome)) => output_batch(&output_format, &outcome),
                Ok(None) => output_success(&output_format, "Delete cancelled", None),
                Err(e) => Err(report(&output_format, spec, e)),
            }
        }
    }
}

async fn submit(
    form: &mut MutationController,
    assignments: &[(String, String)],
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let spec = form.spec();
    for (field, value) in assignments {
        form.set_field(field, value).map_err(|e| report(output_format, spec, e))?;
    }

    let body = form.submit().await.map_err(|e| report(output_format, spec, e))?;
    let verb = match form.mode() {
        mutation::SubmitMode::Create => "Created",
        mutation::SubmitMode::Update(_) => "Updated",
    };
    output_success(output_format, &format!("{} {}", verb, spec.label), Some(json!({ "record": body })))
}

async fn loaded_list(
    api: ApiClient,
    spec: &'static ResourceSpec,
    output_format: &OutputFormat,
) -> anyhow::Result<ListController> {
    let mut list = ListController::new(api, spec);
    list.load().await.map_err(|e| report(output_format, spec, e))?;
    Ok(list)
}

/// Guards for a destructive command. On guarded entities the self guard needs
/// the current user; when it cannot be determined the command is refused.
async fn acting_guard(api: &ApiClient, spec: &ResourceSpec, output_format: &OutputFormat) -> anyhow::Result<Guard> {
    let protected = config().guard.protected_username.clone();
    if spec.identity_field.is_none() {
        return Ok(Guard::new(protected, None));
    }

    let user = fetch_current_user(api)
        .await
        .map_err(|e| report(output_format, spec, e))
        .map_err(|e| e.context("Could not determine the current user; log in first"))?;
    Ok(Guard::new(protected, Some(&user)))
}
