use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

pub(crate) use text_enum;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

text_enum!(SignalType {
    PreEntry => "PRE_ENTRY",
    Entry => "ENTRY",
});

text_enum!(Direction {
    Buy => "BUY",
    Sell => "SELL",
});

text_enum!(SignalStyle {
    Normal => "NORMAL",
    Quick => "QUICK",
});

text_enum!(RequestedBy {
    Admin => "ADMIN",
    Auto => "AUTO",
});

text_enum!(SignalStatus {
    Active => "ACTIVE",
});

text_enum!(Macd {
    BullishCross => "BULLISH_CROSS",
    BearishCross => "BEARISH_CROSS",
    Neutral => "NEUTRAL",
});

text_enum!(VolumeLevel {
    AboveAverage => "ABOVE_AVERAGE",
    High => "HIGH",
    VeryHigh => "VERY_HIGH",
});

text_enum!(Momentum {
    StrongBullish => "STRONG_BULLISH",
    StrongBearish => "STRONG_BEARISH",
    Building => "BUILDING",
});

text_enum!(RiskRating {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});

text_enum!(ExecutionSpeed {
    QuickTrade => "QUICK_TRADE",
    Normal => "NORMAL",
});

impl SignalStyle {
    pub fn parse_arg(arg: &str) -> Option<Self> {
        match arg.to_ascii_uppercase().as_str() {
            "QUICK" | "FAST" | "Q" => Some(Self::Quick),
            "NORMAL" => Some(Self::Normal),
            _ => None,
        }
    }
}

impl RequestedBy {
    /// Session label stored alongside the signal.
    pub fn session_context(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN_24_7",
            Self::Auto => "AUTO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    pub rsi: u32,
    pub macd: Macd,
    pub stochastic: u32,
    pub volume: VolumeLevel,
    pub atr: f64,
}

/// Fabricated technical analysis attached to every signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub signal_style: SignalStyle,
    pub candle_pattern: String,
    pub timeframe: String,
    pub market_condition: String,
    pub key_level: f64,
    pub momentum: Momentum,
    pub indicators: Indicators,
    pub confidence_boost: f64,
    pub execution_speed: ExecutionSpeed,
    pub new_candle_analysis: bool,
    pub risk_rating: RiskRating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub signal_id: String,
    pub symbol: String,
    pub signal_type: SignalType,
    pub direction: Direction,
    pub entry_price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub confidence: f64,
    pub session_type: String,
    pub analysis: Analysis,
    pub time_to_entry: u32,
    pub risk_reward: f64,
    pub signal_style: SignalStyle,
    pub requested_by: RequestedBy,
    pub status: SignalStatus,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    pub fn is_entry(&self) -> bool {
        self.signal_type == SignalType::Entry
    }
}

/// Row shape used by the recent signals listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSummary {
    pub symbol: String,
    pub signal_type: SignalType,
    pub direction: Direction,
    pub entry_price: f64,
    pub confidence: f64,
    pub signal_style: SignalStyle,
    pub requested_by: RequestedBy,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalCounts {
    pub users: i64,
    pub signals: i64,
    pub quick_signals: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_enum_round_trip_through_str() {
        assert_eq!("PRE_ENTRY".parse::<SignalType>().unwrap(), SignalType::PreEntry);
        assert_eq!(Direction::Sell.as_str(), "SELL");
        assert_eq!(RequestedBy::Admin.to_string(), "ADMIN");

        let err = "HOLD".parse::<Direction>().unwrap_err();
        assert_eq!(err.kind, "Direction");
        assert_eq!(err.value, "HOLD");
    }

    #[test]
    fn test_style_args() {
        assert_eq!(SignalStyle::parse_arg("quick"), Some(SignalStyle::Quick));
        assert_eq!(SignalStyle::parse_arg("Q"), Some(SignalStyle::Quick));
        assert_eq!(SignalStyle::parse_arg("fast"), Some(SignalStyle::Quick));
        assert_eq!(SignalStyle::parse_arg("EUR/USD"), None);
    }

    #[test]
    fn test_analysis_serializes_screaming_case() {
        let analysis = Analysis {
            signal_style: SignalStyle::Quick,
            candle_pattern: "Doji candle indicating reversal".into(),
            timeframe: "M1".into(),
            market_condition: "Liquidity pool activation".into(),
            key_level: 1.0812,
            momentum: Momentum::Building,
            indicators: Indicators {
                rsi: 40,
                macd: Macd::BullishCross,
                stochastic: 55,
                volume: VolumeLevel::VeryHigh,
                atr: 0.0011,
            },
            confidence_boost: 0.04,
            execution_speed: ExecutionSpeed::QuickTrade,
            new_candle_analysis: true,
            risk_rating: RiskRating::Medium,
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["signal_style"], "QUICK");
        assert_eq!(json["indicators"]["macd"], "BULLISH_CROSS");
        assert_eq!(json["execution_speed"], "QUICK_TRADE");

        let back: Analysis = serde_json::from_value(json).unwrap();
        assert_eq!(back, analysis);
    }
}
