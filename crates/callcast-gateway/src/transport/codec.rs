//! Stream codec for the WebSocket transport.
//!
//! - Outbound records => JSON text frames
//! - Inbound frames only matter for lifecycle: clients send nothing else

use axum::extract::ws::Message;
use serde::Serialize;

use callcast_core::error::{CallcastError, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    /// Client asked to close the stream.
    Close,
    /// Any data/ping/pong frame; streams are one-directional.
    Ignored,
}

pub fn encode_record<T: Serialize>(record: &T) -> Result<Message> {
    let s = serde_json::to_string(record)
        .map_err(|e| CallcastError::Internal(format!("record encode failed: {e}")))?;
    Ok(Message::Text(s))
}

pub fn classify(msg: &Message) -> Inbound {
    match msg {
        Message::Close(_) => Inbound::Close,
        _ => Inbound::Ignored,
    }
}
