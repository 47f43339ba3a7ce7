//! Notification read-state collaborator.

use std::sync::Arc;

use crate::repositories::NotificationStore;
use crate::types::ChatResult;

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Mark all of the user's notifications read; returns how many changed.
    pub async fn mark_all_read(&self, user_id: i64) -> ChatResult<u64> {
        self.store.mark_all_read(user_id).await
    }
}
