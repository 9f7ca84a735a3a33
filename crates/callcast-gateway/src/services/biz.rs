use async_trait::async_trait;
use serde_json::{json, Value};

use callcast_core::error::{CallcastError, Result};

use crate::intercept::CallContext;
use crate::services::UnaryService;

/// Pass-through business endpoints: `Biz/Check`, `Biz/Add`, `Biz/Test`.
#[derive(Default)]
pub struct BizService;

impl BizService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UnaryService for BizService {
    fn svc(&self) -> &'static str {
        "Biz"
    }

    async fn handle(&self, cx: &CallContext, method: &str) -> Result<Value> {
        match method {
            "Check" | "Add" | "Test" => {
                tracing::debug!(consumer = %cx.consumer(), method, "biz call");
                Ok(json!({}))
            }
            _ => Err(CallcastError::NotFound(format!("unknown Biz method: {method}"))),
        }
    }
}
