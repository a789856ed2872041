use std::time::Duration;

use chrono::{Local, NaiveTime};
use rand::Rng;
use tokio::sync::broadcast;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use common::config::Config;
use common::models::{RequestedBy, Signal, SignalStyle};
use strategy::SessionStatus;
use strategy::session_clock::session_at;

use crate::services::signal_pipeline::SignalPipeline;

fn local_time() -> NaiveTime {
    Local::now().time()
}

/// Background generator: one pre-entry/entry sequence per cycle while a
/// trading session is open.
pub struct AutoSignalService {
    pipeline: SignalPipeline,
    pre_entry_delay: Duration,
    cycle_interval_secs: (u64, u64),
    error_backoff: Duration,
    clock: fn() -> NaiveTime,
    notification_tx: Option<broadcast::Sender<Signal>>,
}

impl AutoSignalService {
    pub fn new(pipeline: SignalPipeline, config: &Config) -> Self {
        Self {
            pipeline,
            pre_entry_delay: config.pre_entry_delay,
            cycle_interval_secs: config.cycle_interval_secs,
            error_backoff: config.error_backoff,
            clock: local_time,
            notification_tx: None,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, tx: broadcast::Sender<Signal>) -> Self {
        self.notification_tx = Some(tx);
        self
    }

    pub async fn start(self, shutdown: CancellationToken) {
        info!("Auto signal generation started");

        while !shutdown.is_cancelled() {
            let pause = match self.run_cycle().await {
                Ok(()) => self.next_interval(),
                Err(e) => {
                    error!("Auto signal error: {:#}", e);
                    self.error_backoff
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = time::sleep(pause) => {}
            }
        }

        info!("Auto signal generation stopped");
    }

    async fn run_cycle(&self) -> anyhow::Result<()> {
        let session = match session_at(&(self.clock)()) {
            SessionStatus::Open(session) => session,
            SessionStatus::Closed => {
                debug!("Market closed, skipping cycle");
                return Ok(());
            }
        };

        let Some(symbol) = session.primary_pair() else {
            return Ok(());
        };

        info!("Generating {} signals", session.name);

        let pre = self
            .pipeline
            .announce(symbol, SignalStyle::Normal, RequestedBy::Auto)
            .await?;
        self.notify(&pre);

        time::sleep(self.pre_entry_delay).await;

        match self.pipeline.enter(&pre.signal_id).await? {
            Some(entry) => self.notify(&entry),
            None => warn!("Entry for {} was already consumed", pre.signal_id),
        }
        Ok(())
    }

    fn next_interval(&self) -> Duration {
        let (min, max) = self.cycle_interval_secs;
        Duration::from_secs(rand::thread_rng().gen_range(min..=max.max(min)))
    }

    fn notify(&self, signal: &Signal) {
        if let Some(ref tx) = self.notification_tx {
            let _ = tx.send(signal.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::SignalType;
    use common::store::SignalStore;
    use mockall::mock;
    use std::sync::Arc;
    use strategy::SignalGenerator;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    mock! {
        pub Store {}

        #[async_trait]
        impl SignalStore for Store {
            async fn save_signal(&self, signal: &Signal) -> anyhow::Result<()>;
        }
    }

    fn morning() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    fn afternoon() -> NaiveTime {
        NaiveTime::from_hms_opt(14, 0, 0).unwrap()
    }

    fn test_config() -> Config {
        Config::from_lookup(|key| match key {
            "TELEGRAM_BOT_TOKEN" => Some("1:test".to_string()),
            "ADMIN_TOKEN" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn service(
        store: MockStore,
        clock: fn() -> NaiveTime,
    ) -> (AutoSignalService, Arc<SignalGenerator>) {
        let config = test_config();
        let generator = Arc::new(SignalGenerator::new(config.pre_entry_delay));
        let pipeline = SignalPipeline::new(generator.clone(), Arc::new(store));
        let svc = AutoSignalService::new(pipeline, &config).with_clock(clock);
        (svc, generator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_session_emits_pre_entry_then_entry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = MockStore::new();
        store.expect_save_signal().returning(move |s| {
            let _ = tx.send((s.clone(), Instant::now()));
            Ok(())
        });

        let (svc, generator) = service(store, morning);
        let shutdown = CancellationToken::new();
        let started = Instant::now();
        let handle = tokio::spawn(svc.start(shutdown.clone()));

        let (pre, pre_at) = rx.recv().await.unwrap();
        let (entry, entry_at) = rx.recv().await.unwrap();
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(pre.symbol, "EUR/USD");
        assert_eq!(pre.signal_type, SignalType::PreEntry);
        assert_eq!(pre.requested_by, RequestedBy::Auto);
        assert_eq!(pre.signal_style, SignalStyle::Normal);
        assert_eq!(pre.take_profit, 0.0);
        assert_eq!(pre.time_to_entry, 40);

        assert_eq!(entry.signal_type, SignalType::Entry);
        assert_eq!(entry.direction, pre.direction);
        assert_ne!(entry.take_profit, 0.0);
        assert_ne!(entry.stop_loss, 0.0);

        assert_eq!(pre_at, started);
        assert!(entry_at - pre_at >= Duration::from_secs(40));
        assert_eq!(generator.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_session_generates_nothing() {
        let mut store = MockStore::new();
        store.expect_save_signal().never();

        let (svc, generator) = service(store, afternoon);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(svc.start(shutdown.clone()));

        time::sleep(Duration::from_secs(3 * 3600)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(generator.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_backs_off_then_retries() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut calls = 0;
        let mut store = MockStore::new();
        store.expect_save_signal().returning(move |s| {
            calls += 1;
            if calls == 1 {
                return Err(anyhow::anyhow!("database is locked"));
            }
            let _ = tx.send((s.clone(), Instant::now()));
            Ok(())
        });

        let (svc, generator) = service(store, morning);
        let shutdown = CancellationToken::new();
        let started = Instant::now();
        let handle = tokio::spawn(svc.start(shutdown.clone()));

        let (pre, pre_at) = rx.recv().await.unwrap();
        let (entry, _) = rx.recv().await.unwrap();
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(pre_at - started, Duration::from_secs(60));
        assert_eq!(pre.signal_type, SignalType::PreEntry);
        assert_eq!(entry.signal_type, SignalType::Entry);
        assert_eq!(generator.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifier_receives_both_phases() {
        let mut store = MockStore::new();
        store.expect_save_signal().returning(|_| Ok(()));

        let (notify_tx, mut notify_rx) = broadcast::channel(8);
        let (svc, _) = service(store, morning);
        let svc = svc.with_notifier(notify_tx);

        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(svc.start(shutdown.clone()));

        let pre = notify_rx.recv().await.unwrap();
        let entry = notify_rx.recv().await.unwrap();
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(pre.signal_type, SignalType::PreEntry);
        assert_eq!(entry.signal_type, SignalType::Entry);
        assert_eq!(
            entry.signal_id,
            pre.signal_id.replacen("PRE_", "ENTRY_", 1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_cycle_wait() {
        let mut store = MockStore::new();
        store.expect_save_signal().returning(|_| Ok(()));

        let (svc, _) = service(store, morning);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(svc.start(shutdown.clone()));

        // Past the entry phase, well inside the 300-600s cycle wait.
        time::sleep(Duration::from_secs(120)).await;
        let cancelled_at = Instant::now();
        shutdown.cancel();
        handle.await.unwrap();

        assert!(Instant::now() - cancelled_at < Duration::from_secs(1));
    }
}
