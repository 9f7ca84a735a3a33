//! Call-event dispatch.
//!
//! Re-exports the broadcaster, its registry, and the inbox handle that
//! stream sessions hold.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{Dispatcher, Inbox};
pub use registry::{SubscriberRegistry, SubscriptionKey, SubscriptionKind};
