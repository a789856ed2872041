use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use common::models::{Signal, SignalCounts, SignalStyle, SignalSummary};

use super::{SubscriptionRepository, decode_error};

pub struct SignalRepository;

#[derive(sqlx::FromRow)]
struct SignalRow {
    signal_id: String,
    symbol: String,
    signal_type: String,
    direction: String,
    entry_price: f64,
    take_profit: f64,
    stop_loss: f64,
    confidence: f64,
    session_type: String,
    analysis: String,
    time_to_entry: i64,
    risk_reward: f64,
    signal_style: String,
    requested_by: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SignalRow> for Signal {
    type Error = sqlx::Error;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        Ok(Signal {
            signal_id: row.signal_id,
            symbol: row.symbol,
            signal_type: row.signal_type.parse().map_err(decode_error)?,
            direction: row.direction.parse().map_err(decode_error)?,
            entry_price: row.entry_price,
            take_profit: row.take_profit,
            stop_loss: row.stop_loss,
            confidence: row.confidence,
            session_type: row.session_type,
            analysis: serde_json::from_str(&row.analysis).map_err(decode_error)?,
            time_to_entry: u32::try_from(row.time_to_entry).map_err(decode_error)?,
            risk_reward: row.risk_reward,
            signal_style: row.signal_style.parse().map_err(decode_error)?,
            requested_by: row.requested_by.parse().map_err(decode_error)?,
            status: row.status.parse().map_err(decode_error)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    symbol: String,
    signal_type: String,
    direction: String,
    entry_price: f64,
    confidence: f64,
    signal_style: String,
    requested_by: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SummaryRow> for SignalSummary {
    type Error = sqlx::Error;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(SignalSummary {
            symbol: row.symbol,
            signal_type: row.signal_type.parse().map_err(decode_error)?,
            direction: row.direction.parse().map_err(decode_error)?,
            entry_price: row.entry_price,
            confidence: row.confidence,
            signal_style: row.signal_style.parse().map_err(decode_error)?,
            requested_by: row.requested_by.parse().map_err(decode_error)?,
            created_at: row.created_at,
        })
    }
}

impl SignalRepository {
    pub async fn insert(pool: &SqlitePool, signal: &Signal) -> Result<(), sqlx::Error> {
        let analysis = serde_json::to_string(&signal.analysis)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
                INSERT INTO signals (
                    signal_id, symbol, signal_type, direction, entry_price, take_profit,
                    stop_loss, confidence, session_type, analysis, time_to_entry,
                    risk_reward, signal_style, requested_by, status, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&signal.signal_id)
        .bind(&signal.symbol)
        .bind(signal.signal_type.as_str())
        .bind(signal.direction.as_str())
        .bind(signal.entry_price)
        .bind(signal.take_profit)
        .bind(signal.stop_loss)
        .bind(signal.confidence)
        .bind(&signal.session_type)
        .bind(analysis)
        .bind(i64::from(signal.time_to_entry))
        .bind(signal.risk_reward)
        .bind(signal.signal_style.as_str())
        .bind(signal.requested_by.as_str())
        .bind(signal.status.as_str())
        .bind(signal.created_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn find(pool: &SqlitePool, signal_id: &str) -> Result<Option<Signal>, sqlx::Error> {
        let row = sqlx::query_as::<_, SignalRow>(
            r#"
                SELECT signal_id, symbol, signal_type, direction, entry_price, take_profit,
                       stop_loss, confidence, session_type, analysis, time_to_entry,
                       risk_reward, signal_style, requested_by, status, created_at
                FROM signals WHERE signal_id = ?
            "#,
        )
        .bind(signal_id)
        .fetch_optional(pool)
        .await?;

        row.map(Signal::try_from).transpose()
    }

    pub async fn recent(pool: &SqlitePool, limit: i64) -> Result<Vec<SignalSummary>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
                SELECT symbol, signal_type, direction, entry_price, confidence,
                       signal_style, requested_by, created_at
                FROM signals
                ORDER BY created_at DESC, id DESC
                LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(SignalSummary::try_from).collect()
    }

    pub async fn counts(pool: &SqlitePool) -> Result<SignalCounts, sqlx::Error> {
        let users = SubscriptionRepository::count(pool).await?;
        let signals = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM signals")
            .fetch_one(pool)
            .await?;
        let quick_signals =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM signals WHERE signal_style = ?")
                .bind(SignalStyle::Quick.as_str())
                .fetch_one(pool)
                .await?;

        Ok(SignalCounts {
            users,
            signals,
            quick_signals,
        })
    }
}
