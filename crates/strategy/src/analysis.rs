use rand::Rng;
use rand::seq::SliceRandom;

use common::models::{
    Analysis, ExecutionSpeed, Indicators, Macd, Momentum, RiskRating, SignalStyle, VolumeLevel,
};

use crate::round_to;

const QUICK_PATTERNS: &[&str] = &[
    "Bullish Engulfing pattern forming on M5",
    "Bearish Engulfing pattern confirmed",
    "Hammer candle at support with volume",
    "Shooting star at resistance level",
    "Doji candle indicating reversal",
    "Three white soldiers pattern emerging",
];

const NORMAL_PATTERNS: &[&str] = &[
    "Strong bullish candle closing above resistance",
    "Bearish candle breaking support with momentum",
    "Pin bar rejection at key level",
    "Inside bar breakout confirmation",
    "Evening star pattern forming on H1",
    "Morning star reversal pattern confirmed",
];

const QUICK_TIMEFRAMES: &[&str] = &["M1", "M3", "M5"];
const NORMAL_TIMEFRAMES: &[&str] = &["M5", "M15", "H1"];

const MARKET_CONDITIONS: &[&str] = &[
    "New candle forming with strong momentum",
    "Price reacting to key Fibonacci level",
    "Institutional order flow detected",
    "Market structure break confirmed",
    "Liquidity pool activation",
    "Economic data driving momentum",
];

const MACD: &[Macd] = &[Macd::BullishCross, Macd::BearishCross, Macd::Neutral];
const VOLUME: &[VolumeLevel] = &[
    VolumeLevel::AboveAverage,
    VolumeLevel::High,
    VolumeLevel::VeryHigh,
];
const MOMENTUM: &[Momentum] = &[
    Momentum::StrongBullish,
    Momentum::StrongBearish,
    Momentum::Building,
];
const RISK: &[RiskRating] = &[RiskRating::Low, RiskRating::Medium, RiskRating::High];

pub const QUICK_CONFIDENCE_BOOST: f64 = 0.04;
pub const NORMAL_CONFIDENCE_BOOST: f64 = 0.02;

struct StyleProfile {
    patterns: &'static [&'static str],
    timeframes: &'static [&'static str],
    confidence_boost: f64,
    speed: ExecutionSpeed,
}

fn profile(style: SignalStyle) -> StyleProfile {
    match style {
        SignalStyle::Quick => StyleProfile {
            patterns: QUICK_PATTERNS,
            timeframes: QUICK_TIMEFRAMES,
            confidence_boost: QUICK_CONFIDENCE_BOOST,
            speed: ExecutionSpeed::QuickTrade,
        },
        SignalStyle::Normal => StyleProfile {
            patterns: NORMAL_PATTERNS,
            timeframes: NORMAL_TIMEFRAMES,
            confidence_boost: NORMAL_CONFIDENCE_BOOST,
            speed: ExecutionSpeed::Normal,
        },
    }
}

fn pick_text<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str]) -> String {
    items.choose(rng).copied().unwrap_or_default().to_string()
}

/// Samples the key level around which the entry is placed.
pub fn key_level<R: Rng + ?Sized>(rng: &mut R, symbol: &str) -> f64 {
    let level = if symbol.contains("EUR") {
        rng.gen_range(1.0750..=1.0950)
    } else {
        rng.gen_range(1.2500..=1.2800)
    };
    round_to(level, 4)
}

pub fn generate_candle_analysis<R: Rng + ?Sized>(
    rng: &mut R,
    symbol: &str,
    style: SignalStyle,
) -> Analysis {
    let profile = profile(style);

    let indicators = Indicators {
        rsi: rng.gen_range(25..=75),
        macd: MACD.choose(rng).copied().unwrap_or(Macd::Neutral),
        stochastic: rng.gen_range(20..=80),
        volume: VOLUME.choose(rng).copied().unwrap_or(VolumeLevel::AboveAverage),
        atr: round_to(rng.gen_range(0.0008..=0.0015), 4),
    };

    Analysis {
        signal_style: style,
        candle_pattern: pick_text(rng, profile.patterns),
        timeframe: pick_text(rng, profile.timeframes),
        market_condition: pick_text(rng, MARKET_CONDITIONS),
        key_level: key_level(rng, symbol),
        momentum: MOMENTUM.choose(rng).copied().unwrap_or(Momentum::Building),
        indicators,
        confidence_boost: profile.confidence_boost,
        execution_speed: profile.speed,
        new_candle_analysis: true,
        risk_rating: RISK.choose(rng).copied().unwrap_or(RiskRating::Medium),
    }
}
