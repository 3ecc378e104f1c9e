use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;
use tracing_subscriber::EnvFilter;

use derivative_core::S3ObjectStore;

mod config;
mod handler;
mod pipeline;
mod transform;

use config::AppConfig;
use handler::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(S3ObjectStore::from_env(config.bucket.clone()).await);

    let state = AppState {
        store,
        config: config.clone(),
    };

    let app = Router::new()
        .route("/", get(handler::resize::<S3ObjectStore>))
        .route("/health", get(handler::health))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        bucket = %config.bucket,
        "derivative-processor starting"
    );

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
