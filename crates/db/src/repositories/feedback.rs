use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use kiosk_core::domain::feedback::Feedback;

use super::{decode_err, FeedbackRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFeedbackRepository {
    pool: DbPool,
}

impl SqlFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback, RepositoryError> {
    let timestamp: String = row.try_get("timestamp").map_err(decode_err)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(decode_err)?;

    Ok(Feedback {
        id: row.try_get("id").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        admission_number: row.try_get("admission_number").map_err(decode_err)?,
        message: row.try_get("message").map_err(decode_err)?,
        timestamp,
    })
}

#[async_trait::async_trait]
impl FeedbackRepository for SqlFeedbackRepository {
    async fn submit(&self, feedback: Feedback) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO feedback (id, name, admission_number, message, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&feedback.id)
        .bind(&feedback.name)
        .bind(&feedback.admission_number)
        .bind(&feedback.message)
        .bind(feedback.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Feedback>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, admission_number, message, timestamp
             FROM feedback ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_feedback).collect()
    }
}
