use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use common::models::AdminSession;

pub struct AdminSessionRepository;

#[derive(sqlx::FromRow)]
struct AdminSessionRow {
    user_id: i64,
    username: Option<String>,
    login_time: DateTime<Utc>,
    expiry_time: DateTime<Utc>,
}

impl From<AdminSessionRow> for AdminSession {
    fn from(row: AdminSessionRow) -> Self {
        AdminSession {
            user_id: row.user_id,
            username: row.username,
            login_time: row.login_time,
            expiry_time: row.expiry_time,
        }
    }
}

impl AdminSessionRepository {
    pub async fn upsert(pool: &SqlitePool, session: &AdminSession) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                INSERT OR REPLACE INTO admin_sessions (user_id, username, login_time, expiry_time)
                VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session.user_id)
        .bind(&session.username)
        .bind(session.login_time)
        .bind(session.expiry_time)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<AdminSession>, sqlx::Error> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            "SELECT user_id, username, login_time, expiry_time FROM admin_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(AdminSession::from))
    }

    pub async fn delete(pool: &SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM admin_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_upsert_replaces_previous_session() {
        let db = Database::in_memory().await.unwrap();
        let first = Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap();
        let second = first + Duration::hours(5);

        for login in [first, second] {
            let session = AdminSession {
                user_id: 11,
                username: Some("desk".to_string()),
                login_time: login,
                expiry_time: login + Duration::hours(24),
            };
            AdminSessionRepository::upsert(db.pool(), &session)
                .await
                .unwrap();
        }

        let stored = AdminSessionRepository::find(db.pool(), 11)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.login_time, second);
        assert_eq!(stored.expiry_time, second + Duration::hours(24));

        AdminSessionRepository::delete(db.pool(), 11).await.unwrap();
        assert!(
            AdminSessionRepository::find(db.pool(), 11)
                .await
                .unwrap()
                .is_none()
        );
    }
}
