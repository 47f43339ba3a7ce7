//! Participant-checked message retrieval.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};

use super::ParticipantRegistry;
use crate::entities::Message;
use crate::repositories::MessageStore;
use crate::types::ChatResult;
use crate::utils::Validator;

#[derive(Clone)]
pub struct MessageAccessor {
    registry: ParticipantRegistry,
    messages: Arc<dyn MessageStore>,
    page_limit: u32,
}

impl MessageAccessor {
    pub fn new(registry: ParticipantRegistry, messages: Arc<dyn MessageStore>, page_limit: u32) -> Self {
        Self {
            registry,
            messages,
            page_limit,
        }
    }

    /// Lazy, ascending stream of the conversation's messages after `after_id`.
    pub async fn stream_messages<'a>(
        &'a self,
        conversation_id: &'a str,
        user_id: i64,
        after_id: Option<i64>,
    ) -> ChatResult<BoxStream<'a, ChatResult<Message>>> {
        if let Some(after_id) = after_id {
            Validator::sequence(after_id)?;
        }
        self.registry
            .require_participant(conversation_id, user_id)
            .await?;

        Ok(self.messages.list_messages(conversation_id, after_id))
    }

    /// One page of [`stream_messages`](Self::stream_messages), at most
    /// `limit` messages (capped by the configured page size).
    pub async fn list_messages(
        &self,
        conversation_id: &str,
        user_id: i64,
        after_id: Option<i64>,
        limit: Option<u32>,
    ) -> ChatResult<Vec<Message>> {
        let limit = Validator::limit(limit, self.page_limit, self.page_limit)?;

        self.stream_messages(conversation_id, user_id, after_id)
            .await?
            .take(limit)
            .try_collect()
            .await
    }
}
