use async_trait::async_trait;
use tokio::sync::mpsc;

use callcast_core::error::{CallcastError, Result};

/// Outbound half of a stream. A send error ends the owning session.
#[async_trait]
pub trait RecordSink<T: Send + 'static>: Send {
    async fn send(&mut self, record: T) -> Result<()>;
}

#[async_trait]
impl<T: Send + 'static> RecordSink<T> for mpsc::Sender<T> {
    async fn send(&mut self, record: T) -> Result<()> {
        mpsc::Sender::send(self, record)
            .await
            .map_err(|_| CallcastError::Delivery("stream receiver dropped".into()))
    }
}
