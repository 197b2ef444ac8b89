use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{self, ServerStatus};
use crate::cli::{utils, OutputFormat};

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(long, help = "Server URL (defaults to CASEDESK_SERVER_URL)")]
        url: Option<String>,
    },

    #[command(about = "Show server information from the API root endpoint")]
    Info {
        #[arg(long, help = "Server URL (defaults to CASEDESK_SERVER_URL)")]
        url: Option<String>,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let base = config::server_url(url);
            match config::ping_server(&base).await {
                ServerStatus::Up => utils::output_success(
                    &output_format,
                    &format!("{} is up", base),
                    Some(json!({ "status": ServerStatus::Up })),
                ),
                ServerStatus::Down => {
                    utils::output_error(&output_format, &format!("{} is down", base), Some("SERVER_DOWN"))?;
                    Err(anyhow::anyhow!("Server unavailable"))
                }
            }
        }
        ServerCommands::Info { url } => {
            let base = config::server_url(url);
            let body: serde_json::Value = reqwest::Client::new()
                .get(format!("{}/", base))
                .timeout(std::time::Duration::from_secs(5))
                .send()
                .await?
                .json()
                .await?;
            utils::output_record(&output_format, "server", &body["data"])
        }
    }
}
