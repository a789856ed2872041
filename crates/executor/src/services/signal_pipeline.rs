use std::sync::Arc;

use tracing::{info, warn};

use common::models::{RequestedBy, Signal, SignalStyle};
use common::store::SignalStore;
use strategy::SignalGenerator;

/// Generates signals and persists every phase through the store.
#[derive(Clone)]
pub struct SignalPipeline {
    generator: Arc<SignalGenerator>,
    store: Arc<dyn SignalStore>,
}

impl SignalPipeline {
    pub fn new(generator: Arc<SignalGenerator>, store: Arc<dyn SignalStore>) -> Self {
        Self { generator, store }
    }

    /// Seconds announced between pre-entry and entry.
    pub fn time_to_entry(&self) -> u32 {
        self.generator.time_to_entry()
    }

    /// Generates and stores a pre-entry signal. A signal that fails to
    /// persist is dropped from the pending set.
    pub async fn announce(
        &self,
        symbol: &str,
        style: SignalStyle,
        requested_by: RequestedBy,
    ) -> anyhow::Result<Signal> {
        let pre = self
            .generator
            .generate_pre_entry(symbol, style, requested_by)
            .await;

        if let Err(e) = self.store.save_signal(&pre).await {
            self.generator.discard(&pre.signal_id).await;
            return Err(e.context(format!("storing pre-entry {}", pre.signal_id)));
        }

        info!(
            "Pre-entry: {} {} ({}, {})",
            pre.symbol, pre.direction, pre.signal_style, pre.requested_by
        );
        Ok(pre)
    }

    /// Promotes and stores the entry signal. `None` when the pre-entry is no
    /// longer pending.
    pub async fn enter(&self, pre_signal_id: &str) -> anyhow::Result<Option<Signal>> {
        let Some(entry) = self.generator.promote(pre_signal_id).await else {
            warn!("Pre-entry {} is not pending, no entry emitted", pre_signal_id);
            return Ok(None);
        };

        self.store
            .save_signal(&entry)
            .await
            .map_err(|e| e.context(format!("storing entry {}", entry.signal_id)))?;

        info!(
            "Entry: {} {} TP={:.5} SL={:.5} RR={}",
            entry.symbol, entry.direction, entry.take_profit, entry.stop_loss, entry.risk_reward
        );
        Ok(Some(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use storage::Database;
    use storage::repositories::SignalRepository;

    #[tokio::test]
    async fn test_both_phases_are_persisted() {
        let db = Database::in_memory().await.unwrap();
        let generator = Arc::new(SignalGenerator::new(Duration::from_secs(40)));
        let pipeline = SignalPipeline::new(generator, Arc::new(db.clone()));

        let pre = pipeline
            .announce("EUR/USD", SignalStyle::Quick, RequestedBy::Admin)
            .await
            .unwrap();
        let entry = pipeline.enter(&pre.signal_id).await.unwrap().unwrap();

        let stored_pre = SignalRepository::find(db.pool(), &pre.signal_id)
            .await
            .unwrap()
            .unwrap();
        let stored_entry = SignalRepository::find(db.pool(), &entry.signal_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stored_pre.take_profit, 0.0);
        assert_eq!(stored_entry.take_profit, entry.take_profit);
        assert_eq!(stored_entry.risk_reward, entry.risk_reward);

        let counts = SignalRepository::counts(db.pool()).await.unwrap();
        assert_eq!(counts.signals, 2);
        assert_eq!(counts.quick_signals, 2);
    }

    #[tokio::test]
    async fn test_second_enter_is_absent() {
        let db = Database::in_memory().await.unwrap();
        let generator = Arc::new(SignalGenerator::new(Duration::from_secs(40)));
        let pipeline = SignalPipeline::new(generator, Arc::new(db));

        let pre = pipeline
            .announce("GBP/USD", SignalStyle::Normal, RequestedBy::Auto)
            .await
            .unwrap();

        assert!(pipeline.enter(&pre.signal_id).await.unwrap().is_some());
        assert!(pipeline.enter(&pre.signal_id).await.unwrap().is_none());
    }
}
