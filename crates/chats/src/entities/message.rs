use serde::{Deserialize, Serialize};

/// A persisted message.
///
/// `sequence` is the storage row id. It increases monotonically across the
/// whole store and is the only ordering key used for listing, search results
/// and read markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "id")]
    pub public_id: String,
    pub sequence: i64,
    /// Public id of the owning conversation
    pub conversation_id: String,
    #[serde(skip)]
    pub author_id: i64,
    #[serde(rename = "authorId")]
    pub author_public_id: String,
    pub body: String,
    pub created_at: String,
}

impl Message {
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}
