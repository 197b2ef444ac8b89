pub mod commands;
pub mod config;
pub mod context;
pub mod utils;

pub use context::Shell;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "casedesk")]
#[command(about = "Casedesk CLI - Immigration case management from the terminal")]
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
    #[command(about = "Sign in, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Summary of your cases, documents and upcoming events")]
    Dashboard,

    #[command(about = "Check what the route guard decides for a page")]
    Route {
        #[command(subcommand)]
        cmd: commands::route::RouteCommands,
    },

    #[command(about = "List and open cases")]
    Case {
        #[command(subcommand)]
        cmd: commands::case::CaseCommands,
    },

    #[command(about = "Document types and uploads")]
    Document {
        #[command(subcommand)]
        cmd: commands::document::DocumentCommands,
    },

    #[command(about = "Organization management")]
    Org {
        #[command(subcommand)]
        cmd: commands::org::OrgCommands,
    },

    #[command(about = "View and edit your profile")]
    Profile {
        #[command(subcommand)]
        cmd: commands::profile::ProfileCommands,
    },

    #[command(about = "Administration (admin role required)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Upcoming calendar events")]
    Calendar {
        #[command(subcommand)]
        cmd: commands::calendar::CalendarCommands,
    },

    #[command(about = "Check a running casedesk-server")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },

    #[command(about = "Interactive session sharing one sign-in across commands")]
    Shell,
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

    // Server checks talk HTTP only and need no backend session
    let command = match cli.command {
        Commands::Server { cmd } => return commands::server::handle(cmd, output_format).await,
        other => other,
    };

    let shell = Shell::open(output_format).await?;
    let result = match command {
        Commands::Shell => commands::shell::run(&shell).await,
        other => dispatch(&shell, other).await,
    };
    shell.flush_toasts()?;
    result
}

/// Run one command against an open shell
pub async fn dispatch(shell: &Shell, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, shell).await,
        Commands::Dashboard => commands::dashboard::handle(shell).await,
        Commands::Route { cmd } => commands::route::handle(cmd, shell).await,
        Commands::Case { cmd } => commands::case::handle(cmd, shell).await,
        Commands::Document { cmd } => commands::document::handle(cmd, shell).await,
        Commands::Org { cmd } => commands::org::handle(cmd, shell).await,
        Commands::Profile { cmd } => commands::profile::handle(cmd, shell).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, shell).await,
        Commands::Calendar { cmd } => commands::calendar::handle(cmd, shell).await,
        Commands::Server { cmd } => commands::server::handle(cmd, shell.format).await,
        Commands::Shell => Err(anyhow::anyhow!("Already in an interactive shell")),
    }
}
