//! Unary calls: `POST /{Service}/{Method}`.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;

use crate::app_state::AppState;
use crate::intercept::CallMeta;

use super::error::HttpError;

pub async fn call_unary(
    State(app): State<AppState>,
    Path((service, method)): Path<(String, String)>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<Value>, HttpError> {
    let mut meta = CallMeta::new(format!("{service}/{method}")).with_metadata(headers);
    if let Some(ConnectInfo(peer)) = connect {
        meta = meta.with_peer(peer);
    }

    let services = app.services();
    let out = app
        .chain()
        .run(&meta, |cx| async move { services.call(&cx).await })
        .await?;
    Ok(Json(out))
}
