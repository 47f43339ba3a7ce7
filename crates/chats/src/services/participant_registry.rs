//! Conversation membership checks.

use std::sync::Arc;

use tracing::warn;

use crate::repositories::ParticipantDirectory;
use crate::types::{ChatError, ChatResult};
use crate::utils::Validator;

/// Answers "may this user see this conversation?" for every other service.
#[derive(Clone)]
pub struct ParticipantRegistry {
    directory: Arc<dyn ParticipantDirectory>,
}

impl ParticipantRegistry {
    pub fn new(directory: Arc<dyn ParticipantDirectory>) -> Self {
        Self { directory }
    }

    /// `Ok(false)` for an existing conversation the user is not part of;
    /// `ConversationNotFound` when the conversation itself does not exist.
    pub async fn is_participant(&self, conversation_id: &str, user_id: i64) -> ChatResult<bool> {
        Validator::conversation_id(conversation_id)?;

        if !self.directory.conversation_exists(conversation_id).await? {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        self.directory.is_member(conversation_id, user_id).await
    }

    /// Like [`is_participant`](Self::is_participant) but turns `false` into `AccessDenied`.
    pub async fn require_participant(&self, conversation_id: &str, user_id: i64) -> ChatResult<()> {
        if self.is_participant(conversation_id, user_id).await? {
            return Ok(());
        }

        warn!(conversation = %conversation_id, user_id, "rejected non-participant");
        Err(ChatError::access_denied(
            "user is not a participant of this conversation",
        ))
    }

    pub async fn visible_conversations(&self, user_id: i64) -> ChatResult<Vec<String>> {
        self.directory.conversations_for_user(user_id).await
    }
}
