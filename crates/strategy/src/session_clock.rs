use chrono::{Local, Timelike};

/// A named time-of-day trading window.
#[derive(Debug, PartialEq)]
pub struct TradingSession {
    pub id: &'static str,
    pub name: &'static str,
    pub start_hour: u32,
    pub end_hour: u32,
    pub pairs: &'static [&'static str],
    pub volatility: &'static str,
    pub accuracy: f64,
}

impl TradingSession {
    pub fn contains_hour(&self, hour: u32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    pub fn primary_pair(&self) -> Option<&'static str> {
        self.pairs.first().copied()
    }
}

pub static SESSIONS: [TradingSession; 3] = [
    TradingSession {
        id: "MORNING",
        name: "European Session",
        start_hour: 8,
        end_hour: 12,
        pairs: &["EUR/USD", "GBP/USD", "EUR/JPY"],
        volatility: "HIGH",
        accuracy: 96.2,
    },
    TradingSession {
        id: "EVENING",
        name: "NY/London Overlap",
        start_hour: 16,
        end_hour: 20,
        pairs: &["USD/JPY", "USD/CAD", "XAU/USD"],
        volatility: "VERY HIGH",
        accuracy: 97.8,
    },
    TradingSession {
        id: "ASIAN",
        name: "Asian Session",
        start_hour: 0,
        end_hour: 4,
        pairs: &["AUD/JPY", "NZD/USD", "USD/JPY"],
        volatility: "MEDIUM",
        accuracy: 92.5,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionStatus {
    Open(&'static TradingSession),
    Closed,
}

impl SessionStatus {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Open(session) => session.id,
            Self::Closed => "CLOSED",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Open(session) => session.name,
            Self::Closed => "Market Closed",
        }
    }
}

/// First window whose hour range contains `hour`.
pub fn session_at_hour(hour: u32) -> SessionStatus {
    SESSIONS
        .iter()
        .find(|s| s.contains_hour(hour))
        .map(SessionStatus::Open)
        .unwrap_or(SessionStatus::Closed)
}

pub fn session_at<T: Timelike>(time: &T) -> SessionStatus {
    session_at_hour(time.hour())
}

pub fn current_session() -> SessionStatus {
    session_at(&Local::now())
}
