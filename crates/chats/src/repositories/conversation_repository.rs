//! Repository for conversations and their participants.

use async_trait::async_trait;
use chrono::Utc;
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::ParticipantDirectory;
use crate::entities::Conversation;
use crate::types::{ChatError, ChatResult};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Repository for conversation database operations
#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a conversation with an initial set of participants.
    pub async fn create(&self, title: Option<&str>, participants: &[i64]) -> ChatResult<Conversation> {
        let now = Utc::now().to_rfc3339();
        let public_id = CUID.create_id();
        let mut tx = self.pool.begin().await?;

        let conversation_id = sqlx::query(
            "INSERT INTO conversations (public_id, title, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(title)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for user_id in participants {
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, joined_at) VALUES (?, ?, ?)",
            )
            .bind(conversation_id)
            .bind(user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(conversation = %public_id, participants = participants.len(), "created conversation");

        Ok(Conversation {
            public_id,
            title: title.map(str::to_owned),
            created_at: now,
        })
    }

    /// Add a participant; adding an existing member is a no-op.
    pub async fn add_participant(&self, conversation_id: &str, user_id: i64) -> ChatResult<()> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id, joined_at)
             SELECT id, ?, ? FROM conversations WHERE public_id = ?",
        )
        .bind(user_id)
        .bind(Utc::now().to_rfc3339())
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && !self.conversation_exists(conversation_id).await? {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        Ok(())
    }
}

#[async_trait]
impl ParticipantDirectory for ConversationRepository {
    async fn conversation_exists(&self, conversation_id: &str) -> ChatResult<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM conversations WHERE public_id = ?")
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn is_member(&self, conversation_id: &str, user_id: i64) -> ChatResult<bool> {
        let row = sqlx::query(
            "SELECT 1 AS present FROM conversation_participants p
             JOIN conversations c ON c.id = p.conversation_id
             WHERE c.public_id = ? AND p.user_id = ?",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(conversation = %conversation_id, user_id, member = row.is_some(), "membership lookup");
        Ok(row.is_some())
    }

    async fn conversations_for_user(&self, user_id: i64) -> ChatResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT c.public_id FROM conversation_participants p
             JOIN conversations c ON c.id = p.conversation_id
             WHERE p.user_id = ? ORDER BY c.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("public_id").map_err(ChatError::from))
            .collect()
    }
}
