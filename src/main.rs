// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use usdt_session_core::blockchain::{RpcChainClient, BSC_MAINNET};
use usdt_session_core::config::{self, SessionConfig};
use usdt_session_core::notify::{LogNotifier, Notifier};
use usdt_session_core::persistence::RestPersistence;
use usdt_session_core::session::WalletSessionManager;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env::var(config::LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());

    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = SessionConfig::from_env();

    let chain = Arc::new(
        RpcChainClient::new(BSC_MAINNET, &config.rpc_url, config.private_key.as_deref())
            .expect("failed to initialize chain client"),
    );
    let persistence = Arc::new(RestPersistence::new(&config.persistence_url));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

    let manager = WalletSessionManager::with_refresh_interval(
        chain,
        persistence,
        notifier,
        BSC_MAINNET,
        config.refresh_interval,
    );

    let shutdown = CancellationToken::new();
    let event_pump = manager.attach_provider_events(shutdown.clone());

    manager.resume_if_available().await;

    let session = manager.snapshot();
    info!(
        connected = session.connected,
        account = session.account.as_ref().map(|a| a.as_str()).unwrap_or("-"),
        network = BSC_MAINNET.name,
        "wallet session ready"
    );

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");

    info!("shutting down wallet session");
    shutdown.cancel();
    manager.disconnect();
    let _ = event_pump.await;
}
