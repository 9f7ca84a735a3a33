//! Business services reachable through unary calls.
//!
//! Services register under their service name (`Biz`) and receive every
//! admitted call whose method starts with `Biz/`.

pub mod biz;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use callcast_core::error::{CallcastError, Result};

use crate::intercept::CallContext;

pub use biz::BizService;

/// Request/response service.
#[async_trait]
pub trait UnaryService: Send + Sync {
    fn svc(&self) -> &'static str;
    async fn handle(&self, cx: &CallContext, method: &str) -> Result<Value>;
}

/// Registry of unary services keyed by service name.
#[derive(Default)]
pub struct ServiceTable {
    unary: DashMap<&'static str, Arc<dyn UnaryService>>,
}

impl ServiceTable {
    pub fn new() -> Self {
        Self { unary: DashMap::new() }
    }

    pub fn register(&self, svc: Arc<dyn UnaryService>) {
        self.unary.insert(svc.svc(), svc);
    }

    pub fn registered_svcs(&self) -> Vec<&'static str> {
        self.unary.iter().map(|e| *e.key()).collect()
    }

    pub async fn call(&self, cx: &CallContext) -> Result<Value> {
        let (svc, method) = cx
            .method()
            .split_once('/')
            .ok_or_else(|| CallcastError::NotFound(format!("malformed method: {}", cx.method())))?;
        let handler = self
            .unary
            .get(svc)
            .ok_or_else(|| CallcastError::NotFound(format!("unknown service: {svc}")))?
            .value()
            .clone();
        handler.handle(cx, method).await
    }
}
