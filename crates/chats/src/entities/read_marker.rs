use serde::{Deserialize, Serialize};

/// Last message a user has read in a conversation.
///
/// There is at most one marker per (conversation, user) pair and its
/// `last_read_message_id` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadMarker {
    pub conversation_id: String,
    #[serde(skip)]
    pub user_id: i64,
    pub last_read_message_id: i64,
    pub updated_at: String,
}

/// Unread state derived from a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadSummary {
    pub conversation_id: String,
    pub unread_count: u64,
    pub last_read_message_id: Option<i64>,
}
