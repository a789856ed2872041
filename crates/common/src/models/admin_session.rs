use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub user_id: i64,
    pub username: Option<String>,
    pub login_time: DateTime<Utc>,
    pub expiry_time: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_time <= now
    }
}
