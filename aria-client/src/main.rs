//! aria client - terminal UI for a local AI assistant backend
//!
//! This is the main entry point for the aria client. It provides a
//! ratatui-based interface for streamed chat, image analysis, system
//! control, and settings management against a single backend.

use aria_utils::{init_logging_with_config, LogConfig, Result};

mod api;
mod chat;
mod cli;
mod config;
mod connection;
mod input;
mod models;
mod settings;
mod system;
mod ui;
mod vision;

use cli::Args;
use config::resolve_server;
use ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments first (before terminal setup)
    let args = Args::parse_args();

    // Initialize logging to file (not stderr, since we're using the terminal)
    let mut log_config = LogConfig::client();
    if let Some(filter) = &args.log {
        log_config.filter = filter.clone();
    }
    init_logging_with_config(log_config)?;
    tracing::info!("aria client starting");
    tracing::debug!("CLI args: {:?}", args);

    // Run the application
    match run_app(args).await {
        Ok(()) => {
            tracing::info!("aria client exiting normally");
            Ok(())
        }
        Err(e) => {
            tracing::error!("aria client error: {}", e);
            // Print error to stderr after terminal restoration
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}

async fn run_app(args: Args) -> Result<()> {
    let server_url = resolve_server(args.server.as_deref());
    tracing::info!("Using backend at {}", server_url);

    let mut app = App::new(&server_url)?;
    app.run().await
}
