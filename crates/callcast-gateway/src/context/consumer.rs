use std::sync::Arc;

use axum::http::HeaderMap;

use callcast_core::error::{CallcastError, Result};

/// Well-known metadata key carrying the consumer identity.
pub const CONSUMER_KEY: &str = "consumer";

/// Resolve the consumer identity. Exactly one non-empty value is required.
pub fn resolve_consumer(metadata: &HeaderMap) -> Result<Arc<str>> {
    let mut values = metadata.get_all(CONSUMER_KEY).iter();
    let (Some(value), None) = (values.next(), values.next()) else {
        return Err(CallcastError::Unauthenticated(
            "expected exactly one consumer".into(),
        ));
    };

    let consumer = value
        .to_str()
        .map_err(|_| CallcastError::Unauthenticated("consumer is not valid text".into()))?
        .trim();
    if consumer.is_empty() {
        return Err(CallcastError::Unauthenticated("consumer is empty".into()));
    }
    Ok(Arc::from(consumer))
}
