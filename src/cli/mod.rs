pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::resource::catalog::{INCIDENTS, PRODUCTS};

#[derive(Parser)]
#[command(name = "tienda")]
#[command(about = "Tienda CLI - back-office client for employees, products and incidents")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Employee accounts")]
    Employees {
        #[command(subcommand)]
        cmd: commands::resource::EmployeeCommands,
    },

    #[command(about = "Product catalogue")]
    Products {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Product incidents")]
    Incidents {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Groups (roles) available to employees")]
    Groups {
        #[command(subcommand)]
        cmd: commands::groups::GroupCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Employees { cmd } => commands::resource::handle_employees(cmd, output_format).await,
        Commands::Products { cmd } => commands::resource::handle(cmd, &PRODUCTS, output_format).await,
        Commands::Incidents { cmd } => commands::resource::handle(cmd, &INCIDENTS, output_format).await,
        Commands::Groups { cmd } => commands::groups::handle(cmd, output_format).await,
    }
}
