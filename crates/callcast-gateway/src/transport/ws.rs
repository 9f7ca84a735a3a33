//! WebSocket stream endpoints.
//!
//! Responsibilities:
//! - Run the interceptor chain on the upgrade request (rejections stay HTTP)
//! - Upgrade HTTP -> WS and attach a Log/Stats session to the socket
//! - Cancel the session when the client closes or the gateway shuts down

use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        ConnectInfo, Query, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use callcast_core::error::{CallcastError, Result};
use callcast_core::protocol::StatInterval;

use crate::app_state::{AppState, LOGGING_METHOD, STATISTICS_METHOD};
use crate::intercept::CallMeta;
use crate::sessions::{LogSession, RecordSink, StatsSession};

use super::codec::{classify, encode_record, Inbound};
use super::error::HttpError;

/// Outbound half of an upgraded socket.
pub struct WsSink {
    tx: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl<T: Serialize + Send + 'static> RecordSink<T> for WsSink {
    async fn send(&mut self, record: T) -> Result<()> {
        let msg = encode_record(&record)?;
        self.tx
            .send(msg)
            .await
            .map_err(|e| CallcastError::Delivery(format!("websocket send failed: {e}")))
    }
}

fn stream_meta(method: &str, headers: HeaderMap, connect: Option<ConnectInfo<SocketAddr>>) -> CallMeta {
    let meta = CallMeta::new(method).with_metadata(headers);
    match connect {
        Some(ConnectInfo(peer)) => meta.with_peer(peer),
        None => meta,
    }
}

fn require_upgrade(ws: Option<WebSocketUpgrade>) -> Result<WebSocketUpgrade> {
    ws.ok_or_else(|| CallcastError::InvalidArgument("websocket upgrade required".into()))
}

// --------------------
// Entry
// --------------------
pub async fn logging_upgrade(
    State(app): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let meta = stream_meta(LOGGING_METHOD, headers, connect);
    let session_app = app.clone();

    let res = app
        .chain()
        .run(&meta, |cx| async move {
            let ws = require_upgrade(ws)?;
            let session = LogSession::new(cx.consumer_arc(), cx.peer_label());
            Ok(ws.on_upgrade(move |socket| serve_log(session_app, socket, session)))
        })
        .await;

    res.unwrap_or_else(|e| HttpError(e).into_response())
}

pub async fn statistics_upgrade(
    State(app): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    query: Option<Query<StatInterval>>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let meta = stream_meta(STATISTICS_METHOD, headers, connect);
    let session_app = app.clone();

    let res = app
        .chain()
        .run(&meta, |cx| async move {
            let Some(Query(StatInterval { interval_seconds })) = query else {
                return Err(CallcastError::InvalidArgument(
                    "expected query `interval_seconds=<integer>`".into(),
                ));
            };
            let session = StatsSession::new(cx.consumer_arc(), interval_seconds)?;
            let ws = require_upgrade(ws)?;
            Ok(ws.on_upgrade(move |socket| serve_stats(session_app, socket, session)))
        })
        .await;

    res.unwrap_or_else(|e| HttpError(e).into_response())
}

// --------------------
// Session plumbing
// --------------------
struct Attached {
    sink: WsSink,
    cancel: CancellationToken,
    reader: JoinHandle<()>,
}

fn attach(app: &AppState, socket: WebSocket) -> Attached {
    let cancel = app.shutdown_token().child_token();
    let (tx, rx) = socket.split();
    let reader = tokio::spawn(watch_close(rx, cancel.clone()));
    Attached { sink: WsSink { tx }, cancel, reader }
}

/// Cancel the session once the client closes or the socket errors.
async fn watch_close(mut rx: SplitStream<WebSocket>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            incoming = rx.next() => {
                match incoming {
                    Some(Ok(msg)) if classify(&msg) == Inbound::Ignored => {}
                    _ => {
                        cancel.cancel();
                        return;
                    }
                }
            }
        }
    }
}

async fn serve_log(app: AppState, socket: WebSocket, session: LogSession) {
    let Attached { sink, cancel, reader } = attach(&app, socket);
    let dispatcher = app.dispatcher();
    let res = session.run(&dispatcher, sink, cancel.clone()).await;
    detach(cancel, reader, "log", res);
}

async fn serve_stats(app: AppState, socket: WebSocket, session: StatsSession) {
    let Attached { sink, cancel, reader } = attach(&app, socket);
    let dispatcher = app.dispatcher();
    let res = session.run(&dispatcher, sink, cancel.clone()).await;
    detach(cancel, reader, "stats", res);
}

fn detach(cancel: CancellationToken, reader: JoinHandle<()>, kind: &'static str, res: Result<()>) {
    cancel.cancel();
    reader.abort();
    if let Err(e) = res {
        tracing::debug!(kind, error = %e, "stream ended with delivery error");
    }
}
