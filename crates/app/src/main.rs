//! FlowDash command-line dashboard.
//!
//! Run with: `flowdash <command>`
//!
//! This is a user-facing CLI, so `println!` and `eprintln!` are
//! intentionally used for output rather than structured logging;
//! diagnostics still go through `tracing` and can be enabled with
//! `RUST_LOG`.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use flowdash_client::{load_config, DashboardClient, KeyringStorage};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod view;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging first so .env loading is visible.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!("loaded .env from {}", path.display()),
        Err(err) => debug!("no .env file loaded: {err}"),
    }

    let mut args = env::args().skip(1);
    let command = args.next();
    let rest: Vec<String> = args.collect();

    let result = match command.as_deref() {
        Some("login") => run(|client| commands::login(client, rest)).await,
        Some("logout") => run(commands::logout).await,
        Some("status") => run(commands::status).await,
        Some("upload") => run(|client| commands::upload(client, rest)).await,
        Some("history") => run(commands::history).await,
        Some("report") => run(|client| commands::report(client, rest)).await,
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(unknown) => {
            eprintln!("Unknown command: {unknown}");
            eprintln!();
            print_help();
            Err(anyhow::anyhow!("Unknown command"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Build a client from configuration, restore the session, run a command
async fn run<F, Fut>(command: F) -> anyhow::Result<()>
where
    F: FnOnce(DashboardClient) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<()>>,
{
    let config = load_config()?;
    debug!(base_url = %config.base_url, "configuration resolved");

    let storage = Arc::new(KeyringStorage::new(&config.keyring_service));
    let client = DashboardClient::new(&config, storage)?;

    match client.initialize().await {
        Ok(true) => debug!("session restored"),
        Ok(false) => debug!("no stored session"),
        Err(err) => warn!("could not restore session: {err}"),
    }

    command(client).await
}

fn print_help() {
    println!("FlowDash Equipment Dashboard");
    println!();
    println!("USAGE:");
    println!("    flowdash <COMMAND>");
    println!();
    println!("COMMANDS:");
    println!("    login <username>   Sign in (password read from stdin)");
    println!("    logout             Sign out and clear stored credentials");
    println!("    status             Show whether a session is active");
    println!("    upload <file.csv>  Upload a CSV file and show its summary");
    println!("    history            Show the most recent uploads");
    println!("    report <id> [dir]  Download the PDF report for a dataset");
    println!("    help               Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    FLOWDASH_API_URL          Backend base URL");
    println!("    FLOWDASH_TIMEOUT_SECS     Request deadline in seconds");
    println!("    FLOWDASH_KEYRING_SERVICE  Keychain service name");
}
