//! Repository for read markers.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::ReadMarkerStore;
use crate::entities::ReadMarker;
use crate::types::ChatResult;

#[derive(Clone)]
pub struct ReadMarkerRepository {
    pool: SqlitePool,
}

impl ReadMarkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadMarkerStore for ReadMarkerRepository {
    async fn advance(&self, conversation_id: &str, user_id: i64, sequence: i64) -> ChatResult<bool> {
        // One statement: SQLite serialises writers, so concurrent calls for the
        // same pair settle on the maximum regardless of arrival order.
        let result = sqlx::query(
            "INSERT INTO read_markers (conversation_id, user_id, last_read_message_id, updated_at)
             SELECT id, ?, ?, ? FROM conversations WHERE public_id = ?
             ON CONFLICT (conversation_id, user_id) DO UPDATE SET
                 last_read_message_id = excluded.last_read_message_id,
                 updated_at = excluded.updated_at
             WHERE excluded.last_read_message_id > read_markers.last_read_message_id",
        )
        .bind(user_id)
        .bind(sequence)
        .bind(Utc::now().to_rfc3339())
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, conversation_id: &str, user_id: i64) -> ChatResult<Option<ReadMarker>> {
        let marker = sqlx::query_as::<_, ReadMarker>(
            "SELECT c.public_id AS conversation_id, r.user_id, r.last_read_message_id, r.updated_at
             FROM read_markers r
             JOIN conversations c ON c.id = r.conversation_id
             WHERE c.public_id = ? AND r.user_id = ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(marker)
    }
}
