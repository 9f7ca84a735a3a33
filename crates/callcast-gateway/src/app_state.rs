//! Shared application state for the callcast gateway.
//!
//! - Compile the ACL once (read-only afterwards).
//! - Spawn the dispatcher loop under the process-wide shutdown token.
//! - Build the interceptor chain and register built-in services.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use callcast_core::error::Result;

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::intercept::InterceptorChain;
use crate::obs::GatewayMetrics;
use crate::policy::AccessPolicy;
use crate::services::{BizService, ServiceTable};

/// Service served by the streaming endpoints rather than the service table.
pub const ADMIN_SERVICE: &str = "Admin";
pub const LOGGING_METHOD: &str = "Admin/Logging";
pub const STATISTICS_METHOD: &str = "Admin/Statistics";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    policy: Arc<AccessPolicy>,
    dispatcher: Arc<Dispatcher>,
    chain: InterceptorChain,
    services: ServiceTable,
    metrics: Arc<GatewayMetrics>,
    shutdown: CancellationToken,
}

impl AppState {
    /// Build application state. Must run inside a Tokio runtime (spawns the
    /// dispatch loop). A malformed ACL is reported as a config error.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let policy = Arc::new(AccessPolicy::new(&cfg.acl)?);

        let metrics = Arc::new(GatewayMetrics::default());
        let shutdown = CancellationToken::new();
        let (dispatcher, _loop) =
            Dispatcher::spawn(&cfg.gateway, Arc::clone(&metrics), shutdown.clone());

        let chain = InterceptorChain::standard(
            Arc::clone(&policy),
            Arc::clone(&dispatcher),
            Arc::clone(&metrics),
        );

        let services = ServiceTable::new();
        services.register(Arc::new(BizService::new()));

        // acl <-> service table sanity check (warn only)
        let svcs = services.registered_svcs();
        for (consumer, patterns) in &cfg.acl {
            for pattern in patterns {
                let svc = pattern.split('/').next().unwrap_or_default();
                if svc == "*" || svc == ADMIN_SERVICE || svcs.iter().any(|s| *s == svc) {
                    continue;
                }
                tracing::warn!(%consumer, %pattern, "acl refers to unregistered service");
            }
        }

        tracing::info!(consumers = cfg.acl.len(), "access policy loaded");

        Ok(Self {
            inner: Arc::new(AppStateInner {
                policy,
                dispatcher,
                chain,
                services,
                metrics,
                shutdown,
            }),
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.inner.dispatcher)
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.inner.chain
    }

    pub fn services(&self) -> &ServiceTable {
        &self.inner.services
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.inner.metrics
    }

    /// Parent token of every stream session and of the dispatch loop.
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    /// Stop accepting readiness, stop the dispatcher, and end every stream.
    pub fn begin_shutdown(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        self.inner.metrics.set_draining();
        self.inner.shutdown.cancel();
        tracing::info!("shutdown started: closing streams");
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("callcast_subscribers", self.inner.dispatcher.subscriber_count() as u64),
            ("callcast_acl_consumers", self.inner.policy.consumers().count() as u64),
        ]
    }
}
