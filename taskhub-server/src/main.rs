//! `TaskHub` API server -- authorization-scoped task management backend.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 0.0.0.0:4000
//! cargo run --bin taskhub-server
//!
//! # Run on custom address
//! cargo run --bin taskhub-server -- --bind 127.0.0.1:8080
//!
//! # Or via environment variable
//! TASKHUB_ADDR=127.0.0.1:8080 cargo run --bin taskhub-server
//! ```
//!
//! Users and their bearer tokens are seeded from the config file
//! (`~/.config/taskhub/config.toml` by default).

use std::sync::Arc;

use clap::Parser;
use taskhub_server::config::{ServerCliArgs, ServerConfig};
use taskhub_server::directory::UserDirectory;
use taskhub_server::server::{self, AppState};

#[tokio::main]
async fn main() {
    let cli = ServerCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match ServerConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        addr = %config.bind_addr,
        users = config.users.len(),
        "starting taskhub server"
    );

    let directory = Arc::new(UserDirectory::new(config.users));
    let state = Arc::new(AppState::new(directory));

    match server::start_server(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "taskhub server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            std::process::exit(1);
        }
    }
}
