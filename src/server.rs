// ABOUTME: Wires configuration into the key store, provider, exchange, and router
// ABOUTME: Runs the HTTP server until the supplied shutdown future resolves
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::config::ServerConfig;
use crate::exchange::TokenExchange;
use crate::identity::DiscordProvider;
use crate::keys::{FileKeyStore, InMemoryKeyStore, KeyLifecycleManager, KeyStore};
use crate::routes::{build_router, BridgeContext};
use axum::Router;
use oidc_bridge_core::errors::{AppError, AppResult};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Key store selected by configuration
#[must_use]
pub fn key_store(config: &ServerConfig) -> Arc<dyn KeyStore> {
    if let Some(path) = &config.key_store_path {
        info!(path = %path.display(), "Using file key store");
        Arc::new(FileKeyStore::new(path.clone()))
    } else {
        warn!("KEY_STORE_PATH not set, signing key will not survive a restart");
        Arc::new(InMemoryKeyStore::new())
    }
}

/// Build the application router for a configuration
#[must_use]
pub fn router(config: &ServerConfig) -> Router {
    let keys = KeyLifecycleManager::new(key_store(config));
    let provider = Arc::new(DiscordProvider::new(&config.discord));
    let exchange = TokenExchange::new(provider, keys, config.exchange_settings());
    build_router(Arc::new(BridgeContext::new(config, exchange)))
}

/// Bind the configured port and serve until `shutdown` resolves
///
/// # Errors
///
/// Returns an error if the port cannot be bound or the server fails
pub async fn serve<F>(config: &ServerConfig, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))
}
