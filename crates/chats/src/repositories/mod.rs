//! Data access layer for the conversation core.
//!
//! Services depend on the port traits below rather than on concrete
//! repositories. Each port has a SQLite implementation and an in-memory one
//! ([`InMemoryStore`]) that tests and local tooling substitute freely.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::entities::{Message, ReadMarker};
use crate::types::ChatResult;

pub mod conversation_repository;
pub mod memory;
pub mod message_repository;
pub mod notification_repository;
pub mod read_marker_repository;

pub use conversation_repository::ConversationRepository;
pub use memory::InMemoryStore;
pub use message_repository::MessageRepository;
pub use notification_repository::NotificationRepository;
pub use read_marker_repository::ReadMarkerRepository;

/// Membership lookups.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    async fn conversation_exists(&self, conversation_id: &str) -> ChatResult<bool>;

    async fn is_member(&self, conversation_id: &str, user_id: i64) -> ChatResult<bool>;

    /// Public ids of every conversation the user participates in.
    async fn conversations_for_user(&self, user_id: i64) -> ChatResult<Vec<String>>;
}

/// Read-only access to persisted messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Messages of one conversation with a sequence greater than `after`,
    /// ascending. The stream is lazy; consumers stop pulling when they have
    /// enough.
    fn list_messages<'a>(
        &'a self,
        conversation_id: &'a str,
        after: Option<i64>,
    ) -> BoxStream<'a, ChatResult<Message>>;

    async fn find_message(&self, conversation_id: &str, sequence: i64)
        -> ChatResult<Option<Message>>;

    async fn latest_message(&self, conversation_id: &str) -> ChatResult<Option<Message>>;

    /// Messages after `after` that were not written by `reader`.
    async fn count_unread(
        &self,
        conversation_id: &str,
        after: Option<i64>,
        reader: i64,
    ) -> ChatResult<u64>;

    /// Case-insensitive substring search restricted to `scope`, newest first.
    ///
    /// The SQLite adapter prefilters ASCII needles with `LIKE`, which folds ASCII only, so a body
    /// that matches solely through Unicode case folding (e.g. the Kelvin sign for `k`) can be missed.
    async fn search(&self, scope: &[String], needle: &str, limit: usize)
        -> ChatResult<Vec<Message>>;
}

/// Per (conversation, user) read markers.
#[async_trait]
pub trait ReadMarkerStore: Send + Sync {
    /// Move the marker to `sequence` if that is further than the stored value.
    ///
    /// Returns `true` when the stored value changed. Implementations must make
    /// the compare and the write a single atomic step.
    async fn advance(&self, conversation_id: &str, user_id: i64, sequence: i64)
        -> ChatResult<bool>;

    async fn get(&self, conversation_id: &str, user_id: i64) -> ChatResult<Option<ReadMarker>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Mark every unread notification of the user as read, returning how many changed.
    async fn mark_all_read(&self, user_id: i64) -> ChatResult<u64>;
}
