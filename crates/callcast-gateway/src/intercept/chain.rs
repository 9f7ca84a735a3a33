use std::future::Future;
use std::sync::Arc;

use callcast_core::error::Result;

use crate::dispatch::Dispatcher;
use crate::obs::GatewayMetrics;
use crate::policy::AccessPolicy;

use super::context::{CallContext, CallMeta, InterceptContext};
use super::stages::{AuthnStage, AuthzStage, RecordStage, Stage};

pub struct InterceptorChain {
    stages: Vec<Box<dyn Stage>>,
}

impl InterceptorChain {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// authn -> authz -> record.
    pub fn standard(
        policy: Arc<AccessPolicy>,
        dispatcher: Arc<Dispatcher>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self::new(vec![
            Box::new(AuthnStage { metrics: Arc::clone(&metrics) }),
            Box::new(AuthzStage { policy, metrics: Arc::clone(&metrics) }),
            Box::new(RecordStage { dispatcher, metrics }),
        ])
    }

    /// Run every stage; the first failure rejects the call.
    pub async fn admit(&self, meta: &CallMeta) -> Result<CallContext> {
        let mut cx = InterceptContext::from_meta(meta);
        for stage in &self.stages {
            if let Err(e) = stage.handle(&mut cx, meta).await {
                tracing::debug!(stage = stage.name(), method = %cx.method, error = %e, "call rejected");
                return Err(e);
            }
        }
        cx.into_call_context()
    }

    /// Admit, then invoke `handler` and return its result unchanged.
    pub async fn run<F, Fut, T>(&self, meta: &CallMeta, handler: F) -> Result<T>
    where
        F: FnOnce(CallContext) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cx = self.admit(meta).await?;
        handler(cx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewaySection;
    use crate::dispatch::SubscriptionKind;
    use callcast_core::error::CallcastError;
    use tokio_util::sync::CancellationToken;

    fn setup(acl: &str) -> (InterceptorChain, Arc<Dispatcher>, Arc<GatewayMetrics>, CancellationToken) {
        let metrics = Arc::new(GatewayMetrics::default());
        let shutdown = CancellationToken::new();
        let (dispatcher, _) =
            Dispatcher::spawn(&GatewaySection::default(), Arc::clone(&metrics), shutdown.clone());
        let policy = Arc::new(AccessPolicy::from_json(acl).unwrap());
        let chain = InterceptorChain::standard(policy, Arc::clone(&dispatcher), Arc::clone(&metrics));
        (chain, dispatcher, metrics, shutdown)
    }

    #[tokio::test]
    async fn missing_consumer_rejected_before_record() {
        let (chain, dispatcher, metrics, _shutdown) = setup(r#"{"obs": ["Admin/*"], "u": ["Biz/*"]}"#);
        let mut inbox = dispatcher.register(Arc::<str>::from("obs"), SubscriptionKind::Log);

        let err = chain.admit(&CallMeta::new("Biz/Check")).await.unwrap_err();
        assert!(matches!(err, CallcastError::Unauthenticated(_)));
        assert_eq!(metrics.call_rejections.get(&[("reason", "unauthenticated")]), 1);

        // an admitted call afterwards is the first thing the observer sees
        chain.admit(&CallMeta::new("Biz/Add").with_consumer("u")).await.unwrap();
        let ev = inbox.recv().await.unwrap();
        assert_eq!(&*ev.method, "Biz/Add");
    }

    #[tokio::test]
    async fn denied_call_never_runs_handler() {
        let (chain, _dispatcher, metrics, _shutdown) = setup(r#"{"u": ["Biz/Check"]}"#);

        let mut ran = false;
        let res = chain
            .run(&CallMeta::new("Biz/Add").with_consumer("u"), |_cx| {
                ran = true;
                async { Ok(()) }
            })
            .await;

        assert!(matches!(res, Err(CallcastError::PermissionDenied(_))));
        assert!(!ran);
        assert_eq!(metrics.call_rejections.get(&[("reason", "no_matching_pattern")]), 1);
    }

    #[tokio::test]
    async fn handler_result_propagates_unchanged() {
        let (chain, _dispatcher, metrics, _shutdown) = setup(r#"{"u": ["Biz/*"]}"#);
        let meta = CallMeta::new("Biz/Test").with_consumer("u");

        let out = chain.run(&meta, |cx| async move { Ok(cx.consumer().to_string()) }).await.unwrap();
        assert_eq!(out, "u");

        let err = chain
            .run(&meta, |_cx| async { Err::<(), _>(CallcastError::NotFound("x".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, CallcastError::NotFound(_)));
        assert_eq!(metrics.calls_admitted.get(&[("method", "Biz/Test")]), 2);
    }
}
