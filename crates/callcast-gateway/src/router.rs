//! Axum router wiring.
//!
//! - `POST /{Service}/{Method}`: unary calls
//! - `GET /Admin/Logging`, `GET /Admin/Statistics`: WebSocket streams
//! - `/healthz`, `/readyz`, `/metrics`: ops (no interceptor chain)

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/Admin/Logging", get(transport::ws::logging_upgrade))
        .route("/Admin/Statistics", get(transport::ws::statistics_upgrade))
        .route("/:service/:method", post(transport::unary::call_unary))
        .with_state(state)
}
