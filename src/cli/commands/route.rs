use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, Shell};
use crate::guard::{GuardDecision, Route, RouteGuard};

#[derive(Subcommand)]
pub enum RouteCommands {
    #[command(about = "Resolve the guard for a path, waiting for the session check")]
    Check {
        #[arg(help = "Path, e.g. /cases/new")]
        path: String,
    },

    #[command(about = "List every page and whether you can open it")]
    List,
}

fn describe(decision: &GuardDecision) -> String {
    match decision {
        GuardDecision::Loading => "loading".to_string(),
        GuardDecision::Redirect(target) => format!("redirect {}", target),
        GuardDecision::Render => "render".to_string(),
    }
}

pub async fn handle(cmd: RouteCommands, shell: &Shell) -> anyhow::Result<()> {
    match cmd {
        RouteCommands::Check { path } => {
            let route = Route::parse(&path);
            let mut handle = shell.bootstrap().handle();
            let decision = shell.guard.resolve_route(route, &mut handle).await;
            utils::output_success(
                &shell.format,
                &format!("{} ({}) -> {}", path, route.title(), describe(&decision)),
                Some(json!({ "route": route.path(), "decision": describe(&decision) })),
            )
        }
        RouteCommands::List => {
            let state = shell.settle().await;
            let rows: Vec<_> = Route::ALL
                .into_iter()
                .filter(|r| *r != Route::NotFound)
                .map(|route| {
                    let decision = RouteGuard::decide_route(route, &state, true);
                    json!({
                        "path": route.path(),
                        "title": route.title(),
                        "public": route.is_public(),
                        "decision": describe(&decision),
                    })
                })
                .collect();
            utils::output_list(&shell.format, "routes", &rows, "No routes", |row| {
                format!(
                    "{:<14}{:<18}{}",
                    row["path"].as_str().unwrap_or(""),
                    row["title"].as_str().unwrap_or(""),
                    row["decision"].as_str().unwrap_or("")
                )
            })
        }
    }
}
