use clap::Parser;
use std::io::Write;

use crate::cli::{dispatch, utils, Cli, Shell};

const PROMPT: &str = "casedesk> ";

/// Read commands from stdin until EOF or `exit`, sharing one auth state
pub async fn run(shell: &Shell) -> anyhow::Result<()> {
    let mut line = String::new();

    loop {
        print!("{}", PROMPT);
        std::io::stdout().flush()?;

        line.clear();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let args = match utils::split_args(&line) {
            Ok(args) => args,
            Err(e) => {
                utils::output_error(&shell.format, &e.to_string(), None)?;
                continue;
            }
        };
        match args.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => break,
            _ => {}
        }

        let cli = match Cli::try_parse_from(std::iter::once("casedesk".to_string()).chain(args)) {
            Ok(cli) => cli,
            Err(e) => {
                // clap renders help and usage errors itself
                let _ = e.print();
                continue;
            }
        };

        if let Err(e) = dispatch(shell, cli.command).await {
            utils::output_error(&shell.format, &e.to_string(), None)?;
        }
        shell.flush_toasts()?;
    }
    Ok(())
}
