use async_trait::async_trait;

use crate::models::Signal;

/// Persistence seam for generated signals.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save_signal(&self, signal: &Signal) -> anyhow::Result<()>;
}
