//! Protocol modules (call events + outbound stream records).
//!
//! - `call`: the in-process unit of broadcast, one per authorized call.
//! - `records`: JSON records written to log/statistics streams.
//!
//! Record types derive both `Serialize` and `Deserialize` so stream clients
//! can decode them with the same definitions the gateway encodes with.

pub mod call;
pub mod records;

pub use call::{unix_now, CallEvent};
pub use records::{LogRecord, StatInterval, StatSnapshot};
