// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use identity_server::{
    api::router,
    auth::TokenCodec,
    config::Config,
    seed,
    state::AppState,
    store::UserStore,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("invalid configuration");

    let tokens = TokenCodec::new(
        config.access_token_secret.as_bytes(),
        config.refresh_token_secret.as_bytes(),
    );
    let state = AppState::new(UserStore::new(), tokens);

    // Seeding failure is fatal: the service must not accept traffic
    // with an incomplete authorization catalog.
    seed::run(&state, &config.admin_bootstrap_password)
        .await
        .expect("startup seeding failed");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid bind address");

    tracing::info!(%addr, "identity server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");
    tracing::info!("shutdown signal received");
}
