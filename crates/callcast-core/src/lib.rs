//! callcast core: transport-agnostic call events, outbound stream records,
//! and the error surface shared by the gateway and its clients.
//!
//! This crate carries no runtime or transport dependencies so the record
//! types can be reused by clients decoding the log/statistics streams.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `CallcastError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{CallcastError, ClientCode, Result};
pub use protocol::{unix_now, CallEvent, LogRecord, StatInterval, StatSnapshot};
