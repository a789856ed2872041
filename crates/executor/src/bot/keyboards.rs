use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use url::Url;

/// Callback payloads carried by inline buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Session,
    Signals,
    Stats,
    Plans,
    Contact,
    SignalQuick,
    SignalNormal,
    AdminRefresh,
    AdminSignal,
    TradeDone,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Signals => "signals",
            Self::Stats => "stats",
            Self::Plans => "plans",
            Self::Contact => "contact",
            Self::SignalQuick => "signal_quick",
            Self::SignalNormal => "signal_normal",
            Self::AdminRefresh => "admin_refresh",
            Self::AdminSignal => "admin_signal",
            Self::TradeDone => "trade_done",
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "session" => Self::Session,
            "signals" => Self::Signals,
            "stats" => Self::Stats,
            "plans" => Self::Plans,
            "contact" => Self::Contact,
            "signal_quick" => Self::SignalQuick,
            "signal_normal" => Self::SignalNormal,
            "admin_refresh" => Self::AdminRefresh,
            "admin_signal" => Self::AdminSignal,
            "trade_done" => Self::TradeDone,
            _ => return None,
        };
        Some(action)
    }
}

fn button(text: &str, action: Action) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.as_str())
}

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("🕒 Market Session", Action::Session),
            button("📡 Recent Signals", Action::Signals),
        ],
        vec![
            button("📊 Account Stats", Action::Stats),
            button("💎 Upgrade Plans", Action::Plans),
        ],
        vec![button("📞 Contact Admin", Action::Contact)],
    ])
}

pub fn admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("⚡ Quick Trade", Action::SignalQuick),
            button("📈 Normal Trade", Action::SignalNormal),
        ],
        vec![button("🔄 Refresh", Action::AdminRefresh)],
    ])
}

pub fn entry_actions() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![button("✅ Trade Executed", Action::TradeDone)],
        vec![button("⚡ Another Signal", Action::AdminSignal)],
    ])
}

pub fn contact_menu(handle: &str) -> Result<InlineKeyboardMarkup, url::ParseError> {
    let link = Url::parse(&format!("https://t.me/{}", handle))?;
    Ok(InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::url("📱 Message Admin", link),
    ]]))
}
