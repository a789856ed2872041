use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use common::models::{Direction, RequestedBy, Signal, SignalStatus, SignalStyle, SignalType};

use crate::analysis::generate_candle_analysis;
use crate::round_to;

pub const ENTRY_TICK: f64 = 0.0005;
pub const CONFIDENCE_CAP: f64 = 0.98;
pub const ADMIN_CONFIDENCE_BONUS: f64 = 0.03;
const BUY_PROBABILITY: f64 = 0.52;

/// Price movement and risk multiplier applied on promotion.
pub fn entry_levels(style: SignalStyle) -> (f64, f64) {
    match style {
        SignalStyle::Quick => (0.0020, 0.5),
        SignalStyle::Normal => (0.0035, 0.6),
    }
}

/// Builds a pre-entry signal. Take-profit, stop-loss and risk/reward stay at
/// zero until promotion.
pub fn build_pre_entry<R: Rng + ?Sized>(
    rng: &mut R,
    symbol: &str,
    style: SignalStyle,
    requested_by: RequestedBy,
    time_to_entry: u32,
    now: DateTime<Utc>,
) -> Signal {
    let analysis = generate_candle_analysis(rng, symbol, style);

    let direction = if rng.gen_bool(BUY_PROBABILITY) {
        Direction::Buy
    } else {
        Direction::Sell
    };

    let entry_price = match direction {
        Direction::Buy => round_to(analysis.key_level + ENTRY_TICK, 5),
        Direction::Sell => round_to(analysis.key_level - ENTRY_TICK, 5),
    };

    let mut confidence = rng.gen_range(0.85..0.95);
    if requested_by == RequestedBy::Admin {
        confidence += ADMIN_CONFIDENCE_BONUS;
    }
    if style == SignalStyle::Quick {
        confidence += analysis.confidence_boost;
    }
    let confidence = round_to(confidence, 3).clamp(0.0, CONFIDENCE_CAP);

    Signal {
        signal_id: format!("PRE_{}_{}", symbol.replace('/', ""), now.timestamp()),
        symbol: symbol.to_string(),
        signal_type: SignalType::PreEntry,
        direction,
        entry_price,
        take_profit: 0.0,
        stop_loss: 0.0,
        confidence,
        session_type: requested_by.session_context().to_string(),
        analysis,
        time_to_entry,
        risk_reward: 0.0,
        signal_style: style,
        requested_by,
        status: SignalStatus::Active,
        created_at: now,
    }
}

/// Derives the entry form of a pre-entry signal.
pub fn build_entry(pre: &Signal, now: DateTime<Utc>) -> Signal {
    let (movement, risk_multiplier) = entry_levels(pre.analysis.signal_style);
    let entry = pre.entry_price;

    let (take_profit, stop_loss) = match pre.direction {
        Direction::Buy => (
            round_to(entry + movement, 5),
            round_to(entry - movement * risk_multiplier, 5),
        ),
        Direction::Sell => (
            round_to(entry - movement, 5),
            round_to(entry + movement * risk_multiplier, 5),
        ),
    };

    let reward = (take_profit - entry).abs();
    let risk = (entry - stop_loss).abs();
    let risk_reward = if risk > 0.0 {
        round_to(reward / risk, 2)
    } else {
        0.0
    };

    let signal_id = match pre.signal_id.strip_prefix("PRE_") {
        Some(rest) => format!("ENTRY_{}", rest),
        None => format!("ENTRY_{}", pre.signal_id),
    };

    Signal {
        signal_id,
        signal_type: SignalType::Entry,
        take_profit,
        stop_loss,
        time_to_entry: 0,
        risk_reward,
        created_at: now,
        ..pre.clone()
    }
}

/// Owns pre-entry signals between announcement and promotion.
pub struct SignalGenerator {
    pending: Mutex<HashMap<String, Signal>>,
    time_to_entry: u32,
}

impl SignalGenerator {
    pub fn new(pre_entry_delay: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            time_to_entry: u32::try_from(pre_entry_delay.as_secs()).unwrap_or(u32::MAX),
        }
    }

    pub fn time_to_entry(&self) -> u32 {
        self.time_to_entry
    }

    pub async fn generate_pre_entry(
        &self,
        symbol: &str,
        style: SignalStyle,
        requested_by: RequestedBy,
    ) -> Signal {
        let signal = {
            let mut rng = rand::thread_rng();
            build_pre_entry(
                &mut rng,
                symbol,
                style,
                requested_by,
                self.time_to_entry,
                Utc::now(),
            )
        };
        self.hold(signal).await
    }

    /// Stores a pre-entry signal until promotion. An identifier that is
    /// already pending gets a numeric suffix instead of replacing the
    /// earlier signal.
    pub async fn hold(&self, mut signal: Signal) -> Signal {
        let mut pending = self.pending.lock().await;

        if pending.contains_key(&signal.signal_id) {
            let base = signal.signal_id.clone();
            let mut n = 2;
            while pending.contains_key(&format!("{}_{}", base, n)) {
                n += 1;
            }
            signal.signal_id = format!("{}_{}", base, n);
            warn!(
                "Signal id {} already pending, stored as {}",
                base, signal.signal_id
            );
        }

        pending.insert(signal.signal_id.clone(), signal.clone());
        debug!("Holding {} ({} pending)", signal.signal_id, pending.len());
        signal
    }

    /// Promotes a pending signal to its entry form, consuming it. Returns
    /// `None` for unknown or already promoted identifiers.
    pub async fn promote(&self, pre_signal_id: &str) -> Option<Signal> {
        let pre = self.pending.lock().await.remove(pre_signal_id)?;
        Some(build_entry(&pre, Utc::now()))
    }

    /// Drops a pending signal without promoting it.
    pub async fn discard(&self, pre_signal_id: &str) -> bool {
        self.pending.lock().await.remove(pre_signal_id).is_some()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}
