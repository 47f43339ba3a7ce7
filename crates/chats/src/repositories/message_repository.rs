//! Repository for message data access operations.

use async_trait::async_trait;
use chrono::Utc;
use cuid2::CuidConstructor;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use once_cell::sync::Lazy;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::MessageStore;
use crate::entities::Message;
use crate::types::{ChatError, ChatResult};
use crate::utils::{contains_case_insensitive, escape_like};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// Prefixes a query tail with the projection every [`Message`] row needs.
macro_rules! message_select {
    ($tail:literal) => {
        concat!(
            "SELECT m.id AS sequence, m.public_id, c.public_id AS conversation_id, m.author_id,
                    u.public_id AS author_public_id, m.body, m.created_at
             FROM messages m
             JOIN conversations c ON c.id = m.conversation_id
             JOIN users u ON u.id = m.author_id",
            $tail
        )
    };
}

/// Repository for message database operations
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a conversation.
    pub async fn create(&self, conversation_id: &str, author_id: i64, body: &str) -> ChatResult<Message> {
        let result = sqlx::query(
            "INSERT INTO messages (public_id, conversation_id, author_id, body, created_at)
             SELECT ?, id, ?, ?, ? FROM conversations WHERE public_id = ?",
        )
        .bind(CUID.create_id())
        .bind(author_id)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .bind(conversation_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        let sequence = result.last_insert_rowid();
        info!(conversation = %conversation_id, sequence, "stored message");

        self.find_message(conversation_id, sequence)
            .await?
            .ok_or_else(|| ChatError::internal("inserted message could not be read back"))
    }

    fn scoped_query<'a>(scope: &'a [String]) -> QueryBuilder<'a, Sqlite> {
        let mut builder = QueryBuilder::new(message_select!(" WHERE c.public_id IN ("));
        let mut separated = builder.separated(", ");
        for conversation_id in scope {
            separated.push_bind(conversation_id);
        }
        separated.push_unseparated(")");
        builder
    }

    /// `LIKE` is case-insensitive for ASCII in SQLite, so ASCII needles are
    /// filtered in the database.
    async fn search_ascii(&self, scope: &[String], needle: &str, limit: usize) -> ChatResult<Vec<Message>> {
        let pattern = format!("%{}%", escape_like(needle));

        let mut builder = Self::scoped_query(scope);
        builder.push(" AND m.body LIKE ");
        builder.push_bind(pattern);
        builder.push(" ESCAPE '\\' ORDER BY m.id DESC LIMIT ");
        builder.push_bind(limit as i64);

        let rows = builder
            .build_query_as::<Message>()
            .fetch_all(&self.pool)
            .await?;

        let needle_lower = needle.to_lowercase();
        Ok(rows
            .into_iter()
            .filter(|message| contains_case_insensitive(&message.body, &needle_lower))
            .collect())
    }

    /// Non-ASCII needles need Unicode case folding, which SQLite lacks; stream
    /// newest first and stop once `limit` matches are found.
    async fn search_unicode(&self, scope: &[String], needle: &str, limit: usize) -> ChatResult<Vec<Message>> {
        let needle_lower = needle.to_lowercase();

        let mut builder = Self::scoped_query(scope);
        builder.push(" ORDER BY m.id DESC");

        let query = builder.build_query_as::<Message>();
        let mut rows = query.fetch(&self.pool);
        let mut matches = Vec::new();

        while let Some(message) = rows.try_next().await? {
            if contains_case_insensitive(&message.body, &needle_lower) {
                matches.push(message);
                if matches.len() >= limit {
                    break;
                }
            }
        }

        Ok(matches)
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    fn list_messages<'a>(
        &'a self,
        conversation_id: &'a str,
        after: Option<i64>,
    ) -> BoxStream<'a, ChatResult<Message>> {
        sqlx::query_as::<_, Message>(message_select!(
            " WHERE c.public_id = ? AND m.id > ? ORDER BY m.id ASC"
        ))
        .bind(conversation_id)
        .bind(after.unwrap_or(0))
        .fetch(&self.pool)
        .map_err(ChatError::from)
        .boxed()
    }

    async fn find_message(&self, conversation_id: &str, sequence: i64) -> ChatResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(message_select!(
            " WHERE c.public_id = ? AND m.id = ?"
        ))
        .bind(conversation_id)
        .bind(sequence)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn latest_message(&self, conversation_id: &str) -> ChatResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(message_select!(
            " WHERE c.public_id = ? ORDER BY m.id DESC LIMIT 1"
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn count_unread(&self, conversation_id: &str, after: Option<i64>, reader: i64) -> ChatResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages m
             JOIN conversations c ON c.id = m.conversation_id
             WHERE c.public_id = ? AND m.id > ? AND m.author_id != ?",
        )
        .bind(conversation_id)
        .bind(after.unwrap_or(0))
        .bind(reader)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }

    async fn search(&self, scope: &[String], needle: &str, limit: usize) -> ChatResult<Vec<Message>> {
        if scope.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let messages = if needle.is_ascii() {
            self.search_ascii(scope, needle, limit).await?
        } else {
            self.search_unicode(scope, needle, limit).await?
        };

        debug!(conversations = scope.len(), hits = messages.len(), "message search");
        Ok(messages)
    }
}
