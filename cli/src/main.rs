//! provcheck: verify freshly provisioned cloud servers over SSH

use std::process::ExitCode;

use clap::Parser;
use provcheck_cli::cli::Cli;
use provcheck_cli::output::{OutputContext, json};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let (as_json, no_color) = (cli.json, cli.no_color);
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match json::format_error(&message, "COMMAND_FAILED") {
                Ok(body) if as_json => println!("{body}"),
                _ => OutputContext::new(no_color, false).error(&message),
            }
            ExitCode::FAILURE
        }
    }
}
