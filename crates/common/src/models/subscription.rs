use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::signal::{UnknownVariant, text_enum};

pub const TRIAL_DAYS: i64 = 3;
pub const TRIAL_DAILY_SIGNALS: i64 = 5;
pub const TRIAL_SESSIONS: &[&str] = &["MORNING"];

text_enum!(PlanType {
    Trial => "TRIAL",
    Basic => "BASIC",
    Pro => "PRO",
    Vip => "VIP",
    Premium => "PREMIUM",
});

text_enum!(PaymentStatus {
    Active => "ACTIVE",
    Pending => "PENDING",
    Expired => "EXPIRED",
});

#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub user_id: i64,
    pub plan_type: PlanType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub signals_used: i64,
    pub max_daily_signals: i64,
    pub allowed_sessions: Vec<String>,
}

impl Subscription {
    pub fn trial(user_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            plan_type: PlanType::Trial,
            start_date: now,
            end_date: now + Duration::days(TRIAL_DAYS),
            payment_status: PaymentStatus::Active,
            signals_used: 0,
            max_daily_signals: TRIAL_DAILY_SIGNALS,
            allowed_sessions: TRIAL_SESSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.payment_status == PaymentStatus::Active && self.end_date > now
    }

    pub fn signals_remaining(&self) -> i64 {
        (self.max_daily_signals - self.signals_used).max(0)
    }
}
