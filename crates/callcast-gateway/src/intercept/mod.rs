//! Interceptor chain applied to every inbound call, unary or streaming.
//!
//! Fixed order: resolve consumer -> authorize -> record call event -> run
//! the handler. A failing stage rejects the call before anything after it
//! runs, so rejected calls never reach subscribers.

pub mod chain;
pub mod context;
pub mod stages;

pub use chain::InterceptorChain;
pub use context::{CallContext, CallMeta, InterceptContext};
pub use stages::{AuthnStage, AuthzStage, RecordStage, Stage};
