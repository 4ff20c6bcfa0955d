// ABOUTME: Server binary for the Discord OIDC bridge
// ABOUTME: Loads environment configuration, initializes logging, and serves until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Discord OIDC Bridge Server Binary

use anyhow::Result;
use clap::Parser;
use discord_oidc_bridge::{config::ServerConfig, logging, server};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "oidc-bridge")]
#[command(about = "Discord OAuth2 to OpenID Connect identity token bridge")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    info!("{}", config.summary());

    server::serve(&config, shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
