//! Transport layer (HTTP + WebSocket).
//!
//! Turns HTTP requests into `CallMeta`, runs them through the interceptor
//! chain, and maps results and errors back onto HTTP/WebSocket.

pub mod codec;
pub mod error;
pub mod unary;
pub mod ws;

pub use error::HttpError;
