//! `maltego-trx`: transform server for the Maltego client.
//!
//! # Quick start
//!
//! ```sh
//! # Serve the built-in transforms on the default port:
//! maltego-trx
//!
//! # Custom bind address, with request/response dumps:
//! MALTEGO_BIND=127.0.0.1:9000 MALTEGO_DUMP_MESSAGES=1 RUST_LOG=maltego_server=debug maltego-trx
//! ```
//!
//! # Environment variables
//!
//! See [`maltego_server::ServerConfig::from_env`] for the full list.

use std::sync::Arc;

use maltego_server::{build_router, transforms, ServerConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maltego_server=info,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();

    let registry = transforms::builtin().expect("built-in transform names are unique");
    for name in registry.names() {
        tracing::info!("route: /run/{name}");
    }

    let app = build_router(Arc::new(registry), config.clone());

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    axum::serve(listener, app).await.expect("server error");
}
