//! tinytalk - headless 1:1 chat client for a hosted chat backend.

use clap::Parser;
use std::process::ExitCode;

mod backend;
mod cli;
mod config;
mod core;
mod error;
mod logging;
mod sync;

use cli::Commands;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; keep the guard alive for the process lifetime.
    let _guard = match logging::init() {
        Ok((guard, _)) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Parse command line arguments
    let args = Commands::parse();

    // Run the command
    match args.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
