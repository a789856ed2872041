use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use common::models::Subscription;

use super::decode_error;

pub struct SubscriptionRepository;

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    user_id: i64,
    plan_type: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    payment_status: String,
    signals_used: i64,
    max_daily_signals: i64,
    allowed_sessions: String,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = sqlx::Error;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            user_id: row.user_id,
            plan_type: row.plan_type.parse().map_err(decode_error)?,
            start_date: row.start_date,
            end_date: row.end_date,
            payment_status: row.payment_status.parse().map_err(decode_error)?,
            signals_used: row.signals_used,
            max_daily_signals: row.max_daily_signals,
            allowed_sessions: serde_json::from_str(&row.allowed_sessions).map_err(decode_error)?,
        })
    }
}

impl SubscriptionRepository {
    /// Registers a trial for a first-time user. Existing subscriptions are
    /// left untouched; returns whether a new row was created.
    pub async fn start_trial(
        pool: &SqlitePool,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let trial = Subscription::trial(user_id, now);
        let sessions = serde_json::to_string(&trial.allowed_sessions)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let result = sqlx::query(
            r#"
                INSERT OR IGNORE INTO subscriptions (
                    user_id, plan_type, start_date, end_date, payment_status,
                    signals_used, max_daily_signals, allowed_sessions, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(trial.user_id)
        .bind(trial.plan_type.as_str())
        .bind(trial.start_date)
        .bind(trial.end_date)
        .bind(trial.payment_status.as_str())
        .bind(trial.signals_used)
        .bind(trial.max_daily_signals)
        .bind(sessions)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn find(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
                SELECT user_id, plan_type, start_date, end_date, payment_status,
                       signals_used, max_daily_signals, allowed_sessions
                FROM subscriptions WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions")
            .fetch_one(pool)
            .await
    }
}
