use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_ADMIN_CONTACT: &str = "@FxSignalDesk";
pub const DEFAULT_DB_PATH: &str = "fx_signals.db";
pub const DEFAULT_PRE_ENTRY_DELAY_SECS: u64 = 40;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set in environment")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings shared by every service.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub admin_token: String,
    pub admin_contact: String,
    pub db_path: String,
    pub pre_entry_delay: Duration,
    /// Chat receiving auto-generated signals, if any.
    pub signal_chat_id: Option<i64>,
    pub auto_signals: bool,
    pub cycle_interval_secs: (u64, u64),
    pub error_backoff: Duration,
    pub admin_session_ttl: chrono::Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let admin_token = required("ADMIN_TOKEN")?;

        let admin_contact =
            lookup("ADMIN_CONTACT").unwrap_or_else(|| DEFAULT_ADMIN_CONTACT.to_string());
        let db_path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        // Signal ids carry whole seconds, so a zero delay would let the next
        // pre-entry reuse an id that is already stored.
        let pre_entry_delay = match lookup("PRE_ENTRY_DELAY_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    key: "PRE_ENTRY_DELAY_SECS",
                    value: v.clone(),
                })?,
            None => DEFAULT_PRE_ENTRY_DELAY_SECS,
        };

        let signal_chat_id = match lookup("SIGNAL_CHAT_ID") {
            Some(v) if !v.trim().is_empty() => {
                Some(v.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
                    key: "SIGNAL_CHAT_ID",
                    value: v.clone(),
                })?)
            }
            _ => None,
        };

        let auto_signals = match lookup("AUTO_SIGNALS") {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "AUTO_SIGNALS",
                        value: v,
                    });
                }
            },
            None => true,
        };

        Ok(Self {
            bot_token,
            admin_token,
            admin_contact,
            db_path,
            pre_entry_delay: Duration::from_secs(pre_entry_delay),
            signal_chat_id,
            auto_signals,
            cycle_interval_secs: (300, 600),
            error_backoff: Duration::from_secs(60),
            admin_session_ttl: chrono::Duration::hours(24),
        })
    }

    /// Contact handle without the leading `@`, as used in t.me links.
    pub fn admin_contact_handle(&self) -> &str {
        self.admin_contact.trim_start_matches('@')
    }
}
