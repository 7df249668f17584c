// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use genimage_devserver::{cli::Cli, config::ServerConfig, start_server, version};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; values already in the environment win
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    if !dotenv_loaded {
        tracing::debug!("No .env file found, using process environment");
    }

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(&cli);

    tracing::info!("Starting {}", version::get_version_string());
    tracing::info!(
        "Upstream: {} (timeout: {})",
        config.upstream_url,
        config
            .upstream_timeout
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "transport default".to_string())
    );

    if let Err(e) = start_server(config).await {
        tracing::error!("Server error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
