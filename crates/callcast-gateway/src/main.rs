//! callcast gateway binary.
//!
//! Usage: `callcast-gateway [config.yaml]` (default `callcast.yaml`).
//! Log level via `RUST_LOG` (default `info`).

use std::io;
use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use callcast_core::error::CallcastError;
use callcast_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "callcast-gateway failed");
        std::process::exit(1);
    }
}

#[derive(Debug, thiserror::Error)]
enum ServeError {
    #[error(transparent)]
    Startup(#[from] CallcastError),
    #[error("bind {addr} failed: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("server failed: {0}")]
    Serve(io::Error),
}

async fn run() -> Result<(), ServeError> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "callcast.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        CallcastError::Config(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "callcast-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|source| ServeError::Bind { addr: listen, source })?;

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(ServeError::Serve)?;

    state.begin_shutdown();
    tracing::info!("callcast-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
    // streams are long-lived; end them so graceful shutdown can finish
    state.begin_shutdown();
}
