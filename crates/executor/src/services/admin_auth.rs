use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use common::config::Config;
use common::models::AdminSession;
use storage::Database;
use storage::repositories::AdminSessionRepository;

/// Token based admin access with expiring per-user sessions.
#[derive(Clone)]
pub struct AdminAuth {
    db: Database,
    admin_token: String,
    session_ttl: Duration,
}

impl AdminAuth {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            admin_token: config.admin_token.clone(),
            session_ttl: config.admin_session_ttl,
        }
    }

    pub fn verify_token(&self, token: &str) -> bool {
        !token.is_empty() && token == self.admin_token
    }

    /// Starts or replaces the session of `user_id`.
    pub async fn create_session(
        &self,
        user_id: i64,
        username: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, sqlx::Error> {
        let session = AdminSession {
            user_id,
            username,
            login_time: now,
            expiry_time: now + self.session_ttl,
        };
        AdminSessionRepository::upsert(self.db.pool(), &session).await?;
        Ok(session)
    }

    /// Checks the first word of `args` as the token. A rejected token
    /// leaves any existing session alone.
    pub async fn login(
        &self,
        user_id: i64,
        username: Option<String>,
        args: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let token = args.split_whitespace().next().unwrap_or_default();
        if !self.verify_token(token) {
            warn!("Rejected admin login from user {}", user_id);
            return Ok(false);
        }

        let session = self.create_session(user_id, username, now).await?;
        info!(
            "Admin session for {} valid until {}",
            user_id, session.expiry_time
        );
        Ok(true)
    }

    /// Expired sessions are removed on lookup.
    pub async fn is_admin(&self, user_id: i64, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let Some(session) = AdminSessionRepository::find(self.db.pool(), user_id).await? else {
            return Ok(false);
        };

        if session.is_expired(now) {
            AdminSessionRepository::delete(self.db.pool(), user_id).await?;
            info!("Admin session for {} expired", user_id);
            return Ok(false);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn auth() -> AdminAuth {
        let config = Config::from_lookup(|key| match key {
            "TELEGRAM_BOT_TOKEN" => Some("1:test".to_string()),
            "ADMIN_TOKEN" => Some("letmein".to_string()),
            _ => None,
        })
        .unwrap();
        let db = Database::in_memory().await.unwrap();
        AdminAuth::new(db, &config)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 2, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_grants_access() {
        let auth = auth().await;
        assert!(!auth.is_admin(5, t0()).await.unwrap());

        assert!(auth.login(5, Some("ops".into()), "letmein", t0()).await.unwrap());
        assert!(auth.is_admin(5, t0() + Duration::hours(23)).await.unwrap());
        assert!(!auth.is_admin(6, t0()).await.unwrap());
    }

    #[tokio::test]
    async fn test_wrong_token_rejected() {
        let auth = auth().await;
        assert!(!auth.login(5, None, "guess", t0()).await.unwrap());
        assert!(!auth.login(5, None, "", t0()).await.unwrap());
        assert!(!auth.is_admin(5, t0()).await.unwrap());
    }

    #[tokio::test]
    async fn test_extra_words_after_token_are_ignored() {
        let auth = auth().await;
        assert!(auth.login(7, None, "  letmein please", t0()).await.unwrap());
        assert!(auth.is_admin(7, t0()).await.unwrap());

        assert!(!auth.login(8, None, "please letmein", t0()).await.unwrap());
    }

    #[tokio::test]
    async fn test_session_expires_after_ttl() {
        let auth = auth().await;
        auth.login(9, None, "letmein", t0()).await.unwrap();

        let later = t0() + Duration::hours(24) + Duration::seconds(1);
        assert!(!auth.is_admin(9, later).await.unwrap());

        let stored = AdminSessionRepository::find(auth.db.pool(), 9).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_relogin_extends_session() {
        let auth = auth().await;
        auth.login(9, None, "letmein", t0()).await.unwrap();
        auth.login(9, None, "letmein", t0() + Duration::hours(20))
            .await
            .unwrap();

        assert!(auth.is_admin(9, t0() + Duration::hours(30)).await.unwrap());
    }
}
