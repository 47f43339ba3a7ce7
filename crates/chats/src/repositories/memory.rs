//! In-memory implementation of every storage port.
//!
//! Backs unit tests and API tests that should not touch SQLite. It also
//! counts port calls so tests can assert that rejected requests never reach
//! storage.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tokio::sync::RwLock;

use super::{MessageStore, NotificationStore, ParticipantDirectory, ReadMarkerStore};
use crate::entities::{Message, Notification, ReadMarker};
use crate::types::{ChatError, ChatResult};
use crate::utils::contains_case_insensitive;

#[derive(Default)]
struct State {
    users: HashMap<i64, String>,
    next_user_id: i64,
    conversations: BTreeMap<String, HashSet<i64>>,
    messages: Vec<Message>,
    next_sequence: i64,
    markers: HashMap<(String, i64), ReadMarker>,
    notifications: Vec<Notification>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of port calls served so far
    pub fn store_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn add_user(&self, public_id: &str) -> i64 {
        let mut state = self.state.write().await;
        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.insert(id, public_id.to_owned());
        id
    }

    pub async fn add_conversation(&self, conversation_id: &str, participants: &[i64]) {
        let mut state = self.state.write().await;
        state
            .conversations
            .entry(conversation_id.to_owned())
            .or_default()
            .extend(participants.iter().copied());
    }

    pub async fn add_message(&self, conversation_id: &str, author_id: i64, body: &str) -> ChatResult<Message> {
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(conversation_id) {
            return Err(ChatError::conversation_not_found(conversation_id));
        }

        state.next_sequence += 1;
        let sequence = state.next_sequence;
        let author_public_id = state
            .users
            .get(&author_id)
            .cloned()
            .unwrap_or_else(|| author_id.to_string());

        let message = Message {
            public_id: format!("msg-{sequence}"),
            sequence,
            conversation_id: conversation_id.to_owned(),
            author_id,
            author_public_id,
            body: body.to_owned(),
            created_at: Utc::now().to_rfc3339(),
        };
        state.messages.push(message.clone());
        Ok(message)
    }

    pub async fn add_notification(&self, user_id: i64, title: &str) -> Notification {
        let mut state = self.state.write().await;
        let notification = Notification {
            id: state.notifications.len() as i64 + 1,
            user_id,
            kind: "system".to_owned(),
            title: title.to_owned(),
            body: String::new(),
            read: false,
            created_at: Utc::now().to_rfc3339(),
        };
        state.notifications.push(notification.clone());
        notification
    }

    pub async fn unread_notifications(&self, user_id: i64) -> usize {
        let state = self.state.read().await;
        state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count()
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryStore {
    async fn conversation_exists(&self, conversation_id: &str) -> ChatResult<bool> {
        self.touch();
        Ok(self.state.read().await.conversations.contains_key(conversation_id))
    }

    async fn is_member(&self, conversation_id: &str, user_id: i64) -> ChatResult<bool> {
        self.touch();
        let state = self.state.read().await;
        Ok(state
            .conversations
            .get(conversation_id)
            .is_some_and(|members| members.contains(&user_id)))
    }

    async fn conversations_for_user(&self, user_id: i64) -> ChatResult<Vec<String>> {
        self.touch();
        let state = self.state.read().await;
        Ok(state
            .conversations
            .iter()
            .filter(|(_, members)| members.contains(&user_id))
            .map(|(id, _)| id.clone())
            .collect())
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    fn list_messages<'a>(
        &'a self,
        conversation_id: &'a str,
        after: Option<i64>,
    ) -> BoxStream<'a, ChatResult<Message>> {
        self.touch();
        let after = after.unwrap_or(0);

        stream::once(async move {
            let state = self.state.read().await;
            let page: Vec<ChatResult<Message>> = state
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation_id && m.sequence > after)
                .cloned()
                .map(Ok)
                .collect();
            stream::iter(page)
        })
        .flatten()
        .boxed()
    }

    async fn find_message(&self, conversation_id: &str, sequence: i64) -> ChatResult<Option<Message>> {
        self.touch();
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .find(|m| m.conversation_id == conversation_id && m.sequence == sequence)
            .cloned())
    }

    async fn latest_message(&self, conversation_id: &str) -> ChatResult<Option<Message>> {
        self.touch();
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .rev()
            .find(|m| m.conversation_id == conversation_id)
            .cloned())
    }

    async fn count_unread(&self, conversation_id: &str, after: Option<i64>, reader: i64) -> ChatResult<u64> {
        self.touch();
        let after = after.unwrap_or(0);
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .filter(|m| {
                m.conversation_id == conversation_id && m.sequence > after && !m.is_authored_by(reader)
            })
            .count() as u64)
    }

    async fn search(&self, scope: &[String], needle: &str, limit: usize) -> ChatResult<Vec<Message>> {
        self.touch();
        let needle_lower = needle.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .messages
            .iter()
            .rev()
            .filter(|m| scope.contains(&m.conversation_id))
            .filter(|m| contains_case_insensitive(&m.body, &needle_lower))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReadMarkerStore for InMemoryStore {
    async fn advance(&self, conversation_id: &str, user_id: i64, sequence: i64) -> ChatResult<bool> {
        self.touch();
        let mut state = self.state.write().await;
        if !state.conversations.contains_key(conversation_id) {
            return Ok(false);
        }

        let now = Utc::now().to_rfc3339();
        let key = (conversation_id.to_owned(), user_id);
        match state.markers.get_mut(&key) {
            Some(marker) if marker.last_read_message_id >= sequence => Ok(false),
            Some(marker) => {
                marker.last_read_message_id = sequence;
                marker.updated_at = now;
                Ok(true)
            }
            None => {
                state.markers.insert(
                    key,
                    ReadMarker {
                        conversation_id: conversation_id.to_owned(),
                        user_id,
                        last_read_message_id: sequence,
                        updated_at: now,
                    },
                );
                Ok(true)
            }
        }
    }

    async fn get(&self, conversation_id: &str, user_id: i64) -> ChatResult<Option<ReadMarker>> {
        self.touch();
        let state = self.state.read().await;
        Ok(state
            .markers
            .get(&(conversation_id.to_owned(), user_id))
            .cloned())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn mark_all_read(&self, user_id: i64) -> ChatResult<u64> {
        self.touch();
        let mut state = self.state.write().await;
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
