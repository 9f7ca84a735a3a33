use std::sync::Arc;

use async_trait::async_trait;

use callcast_core::error::{CallcastError, Result};
use callcast_core::protocol::CallEvent;

use crate::context::resolve_consumer;
use crate::dispatch::Dispatcher;
use crate::obs::GatewayMetrics;
use crate::policy::{AccessPolicy, PolicyDecision};

use super::context::{CallMeta, InterceptContext};

/// One step of the interceptor chain.
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, cx: &mut InterceptContext, meta: &CallMeta) -> Result<()>;
}

/// Resolves the consumer identity from call metadata.
pub struct AuthnStage {
    pub metrics: Arc<GatewayMetrics>,
}

#[async_trait]
impl Stage for AuthnStage {
    fn name(&self) -> &'static str {
        "authn"
    }

    async fn handle(&self, cx: &mut InterceptContext, meta: &CallMeta) -> Result<()> {
        match resolve_consumer(&meta.metadata) {
            Ok(consumer) => {
                cx.consumer = Some(consumer);
                Ok(())
            }
            Err(e) => {
                self.metrics.call_rejections.inc(&[("reason", "unauthenticated")]);
                Err(e)
            }
        }
    }
}

/// Checks the consumer against the ACL.
pub struct AuthzStage {
    pub policy: Arc<AccessPolicy>,
    pub metrics: Arc<GatewayMetrics>,
}

#[async_trait]
impl Stage for AuthzStage {
    fn name(&self) -> &'static str {
        "authz"
    }

    async fn handle(&self, cx: &mut InterceptContext, _meta: &CallMeta) -> Result<()> {
        let Some(consumer) = cx.consumer.as_deref() else {
            return Err(CallcastError::Unauthenticated("consumer not resolved".into()));
        };

        match self.policy.decide(consumer, &cx.method) {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(reason) => {
                self.metrics.call_rejections.inc(&[("reason", reason.as_str())]);
                Err(CallcastError::PermissionDenied(format!(
                    "consumer {consumer} has no access to {}",
                    cx.method
                )))
            }
        }
    }
}

/// Submits the admitted call to the dispatcher.
pub struct RecordStage {
    pub dispatcher: Arc<Dispatcher>,
    pub metrics: Arc<GatewayMetrics>,
}

#[async_trait]
impl Stage for RecordStage {
    fn name(&self) -> &'static str {
        "record"
    }

    async fn handle(&self, cx: &mut InterceptContext, _meta: &CallMeta) -> Result<()> {
        let Some(consumer) = cx.consumer.clone() else {
            return Err(CallcastError::Unauthenticated("consumer not resolved".into()));
        };

        let mut ev = CallEvent::new(Arc::clone(&cx.method), consumer);
        if let Some(peer) = cx.peer {
            ev = ev.with_origin(peer.to_string());
        }
        self.dispatcher.submit(ev).await?;
        self.metrics.calls_admitted.inc(&[("method", &*cx.method)]);
        Ok(())
    }
}
