use serde::{Deserialize, Serialize};

/// A conversation as seen by this crate: an opaque public id plus metadata.
///
/// Membership lives in `conversation_participants`; conversations are created
/// by upstream services and only read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(rename = "id")]
    pub public_id: String,
    pub title: Option<String>,
    pub created_at: String,
}
