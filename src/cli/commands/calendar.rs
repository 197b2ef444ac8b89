use clap::Subcommand;

use crate::cli::{utils, Shell};
use crate::guard::Route;

#[derive(Subcommand)]
pub enum CalendarCommands {
    #[command(about = "List calendar events, soonest first")]
    List,
}

pub async fn handle(cmd: CalendarCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        CalendarCommands::List => {
            shell.enter(Route::Calendar).await?;
            let mut events = shell.services.calendar.get_all().await?;
            events.sort_by_key(|e| e.starts_at);
            utils::output_list(&shell.format, "events", &events, "No upcoming events", |e| {
                format!("{}  {}", e.starts_at.format("%Y-%m-%d %H:%M"), e.title)
            })
        }
    }
}
