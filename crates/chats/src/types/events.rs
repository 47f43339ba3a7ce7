//! Events published by the read-state tracker.

use serde::{Deserialize, Serialize};

/// Emitted whenever a read marker moves forward.
///
/// Unread-count consumers subscribe through
/// [`ReadStateTracker::subscribe`](crate::services::ReadStateTracker::subscribe).
/// Calls that leave the marker where it was publish nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadEvent {
    pub conversation_id: String,
    pub user_id: i64,
    pub last_read_message_id: i64,
    pub read_at: String,
}
