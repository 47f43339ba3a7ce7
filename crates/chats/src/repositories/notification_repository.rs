//! Repository for user notifications.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::NotificationStore;
use crate::entities::Notification;
use crate::types::ChatResult;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: SqlitePool,
}

impl NotificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: i64, kind: &str, title: &str, body: &str) -> ChatResult<Notification> {
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query(
            "INSERT INTO notifications (user_id, type, title, body, read, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(Notification {
            id,
            user_id,
            kind: kind.to_owned(),
            title: title.to_owned(),
            body: body.to_owned(),
            read: false,
            created_at: now,
        })
    }

    /// Notifications for a user, newest first
    pub async fn find_by_user_id(&self, user_id: i64, limit: u32) -> ChatResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, type, title, body, read, created_at
             FROM notifications WHERE user_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn mark_all_read(&self, user_id: i64) -> ChatResult<u64> {
        let result = sqlx::query("UPDATE notifications SET read = 1 WHERE user_id = ? AND read = 0")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let updated = result.rows_affected();
        info!(user_id, updated, "marked notifications read");
        Ok(updated)
    }
}
