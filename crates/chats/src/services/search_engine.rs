//! Scoped message search.
//!
//! Results only ever come from conversations the caller participates in.
//! Matching is a case-insensitive substring test on the message body and
//! results are ordered newest first (descending sequence).

use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::ParticipantRegistry;
use crate::entities::Message;
use crate::repositories::MessageStore;
use crate::types::ChatResult;
use crate::utils::{contains_case_insensitive, Validator};

/// Search request after boundary parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    /// Restrict to one conversation; `None` searches every visible conversation.
    pub conversation_id: Option<String>,
    /// Defaults to the configured search limit; capped at the configured maximum.
    pub limit: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Clone)]
pub struct SearchEngine {
    registry: ParticipantRegistry,
    messages: Arc<dyn MessageStore>,
    default_limit: u32,
    max_limit: u32,
}

impl SearchEngine {
    pub fn new(
        registry: ParticipantRegistry,
        messages: Arc<dyn MessageStore>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        Self {
            registry,
            messages,
            default_limit,
            max_limit,
        }
    }

    pub async fn search(&self, user_id: i64, query: &SearchQuery) -> ChatResult<Vec<Message>> {
        let needle = Validator::search_query(&query.query)?;
        let limit = Validator::limit(query.limit, self.default_limit, self.max_limit)?;

        let scope = match query.conversation_id.as_deref() {
            Some(conversation_id) => {
                self.registry
                    .require_participant(conversation_id, user_id)
                    .await?;
                vec![conversation_id.to_owned()]
            }
            None => self.registry.visible_conversations(user_id).await?,
        };

        if scope.is_empty() {
            debug!(user_id, "search skipped, no visible conversations");
            return Ok(Vec::new());
        }

        let needle_lower = needle.to_lowercase();
        let mut results = self.messages.search(&scope, needle, limit).await?;
        results.retain(|message| {
            scope.contains(&message.conversation_id)
                && contains_case_insensitive(&message.body, &needle_lower)
        });
        results.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        results.truncate(limit);

        debug!(user_id, conversations = scope.len(), hits = results.len(), "search completed");
        Ok(results)
    }
}
