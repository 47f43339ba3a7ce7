//! Wire models for the HTTP surface. All bodies use camelCase.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Public message identifier
    pub id: String,
    /// Ordering key; use as `afterId` / `upTo`
    pub sequence: i64,
    pub conversation_id: String,
    /// Public identifier of the author
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

impl From<parlor_chats::Message> for Message {
    fn from(message: parlor_chats::Message) -> Self {
        Self {
            id: message.public_id,
            sequence: message.sequence,
            conversation_id: message.conversation_id,
            author_id: message.author_public_id,
            body: message.body,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadMarker {
    pub conversation_id: String,
    pub last_read_message_id: i64,
    pub updated_at: String,
}

impl From<parlor_chats::ReadMarker> for ReadMarker {
    fn from(marker: parlor_chats::ReadMarker) -> Self {
        Self {
            conversation_id: marker.conversation_id,
            last_read_message_id: marker.last_read_message_id,
            updated_at: marker.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    /// Sequence of the last message read; defaults to the latest message
    pub up_to: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub success: bool,
    pub marker: Option<ReadMarker>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub messages: Vec<Message>,
    /// The query as matched, after trimming
    pub query: String,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub conversation_id: String,
    pub unread_count: u64,
    pub last_read_message_id: Option<i64>,
}

impl From<parlor_chats::UnreadSummary> for UnreadCountResponse {
    fn from(summary: parlor_chats::UnreadSummary) -> Self {
        Self {
            conversation_id: summary.conversation_id,
            unread_count: summary.unread_count,
            last_read_message_id: summary.last_read_message_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub updated_count: u64,
}
