//! Read-state tracking: per (conversation, user) markers and unread counts.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::ParticipantRegistry;
use crate::entities::{ReadMarker, UnreadSummary};
use crate::repositories::{MessageStore, ReadMarkerStore};
use crate::types::{ChatError, ChatResult, ReadEvent};
use crate::utils::Validator;

/// Sole writer of read markers.
#[derive(Clone)]
pub struct ReadStateTracker {
    registry: ParticipantRegistry,
    messages: Arc<dyn MessageStore>,
    markers: Arc<dyn ReadMarkerStore>,
    events: broadcast::Sender<ReadEvent>,
}

impl ReadStateTracker {
    pub fn new(
        registry: ParticipantRegistry,
        messages: Arc<dyn MessageStore>,
        markers: Arc<dyn ReadMarkerStore>,
        event_capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            registry,
            messages,
            markers,
            events,
        }
    }

    /// Receive a [`ReadEvent`] for every marker that moves forward.
    pub fn subscribe(&self) -> broadcast::Receiver<ReadEvent> {
        self.events.subscribe()
    }

    /// Mark a conversation read up to `up_to`, or up to its latest message.
    ///
    /// The marker never moves backwards: a target at or below the stored value
    /// leaves it untouched and publishes no event. Returns the marker as stored
    /// after the call, or `None` when the conversation has no messages and the
    /// user has never read it.
    pub async fn mark_read(
        &self,
        conversation_id: &str,
        user_id: i64,
        up_to: Option<i64>,
    ) -> ChatResult<Option<ReadMarker>> {
        if let Some(sequence) = up_to {
            Validator::sequence(sequence)?;
        }
        self.registry
            .require_participant(conversation_id, user_id)
            .await?;

        let target = match up_to {
            Some(sequence) => {
                self.messages
                    .find_message(conversation_id, sequence)
                    .await?
                    .ok_or_else(|| ChatError::message_not_found(sequence))?
                    .sequence
            }
            None => match self.messages.latest_message(conversation_id).await? {
                Some(latest) => latest.sequence,
                None => {
                    debug!(conversation = %conversation_id, user_id, "nothing to mark read");
                    return self.markers.get(conversation_id, user_id).await;
                }
            },
        };

        let advanced = self.markers.advance(conversation_id, user_id, target).await?;
        let marker = self
            .markers
            .get(conversation_id, user_id)
            .await?
            // the upsert writes nothing once the conversation row is gone
            .ok_or_else(|| ChatError::conversation_not_found(conversation_id))?;

        if advanced {
            info!(
                conversation = %conversation_id,
                user_id,
                last_read = marker.last_read_message_id,
                "read marker advanced"
            );
            // no subscribers is fine
            let _ = self.events.send(ReadEvent {
                conversation_id: conversation_id.to_owned(),
                user_id,
                last_read_message_id: marker.last_read_message_id,
                read_at: Utc::now().to_rfc3339(),
            });
        } else {
            debug!(
                conversation = %conversation_id,
                user_id,
                requested = target,
                stored = marker.last_read_message_id,
                "read marker unchanged"
            );
        }

        Ok(Some(marker))
    }

    pub async fn marker(&self, conversation_id: &str, user_id: i64) -> ChatResult<Option<ReadMarker>> {
        self.registry
            .require_participant(conversation_id, user_id)
            .await?;
        self.markers.get(conversation_id, user_id).await
    }

    /// Messages after the caller's marker that someone else wrote.
    pub async fn unread_count(&self, conversation_id: &str, user_id: i64) -> ChatResult<UnreadSummary> {
        self.registry
            .require_participant(conversation_id, user_id)
            .await?;

        let last_read = self
            .markers
            .get(conversation_id, user_id)
            .await?
            .map(|marker| marker.last_read_message_id);

        let unread_count = self
            .messages
            .count_unread(conversation_id, last_read, user_id)
            .await?;

        Ok(UnreadSummary {
            conversation_id: conversation_id.to_owned(),
            unread_count,
            last_read_message_id: last_read,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryStore;
    use tokio::sync::broadcast::error::TryRecvError;

    struct Fixture {
        store: InMemoryStore,
        tracker: ReadStateTracker,
        alice: i64,
        bob: i64,
        carol: i64,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let alice = store.add_user("alice").await;
        let bob = store.add_user("bob").await;
        let carol = store.add_user("carol").await;
        store.add_conversation("C1", &[alice, bob]).await;

        let tracker = ReadStateTracker::new(
            ParticipantRegistry::new(Arc::new(store.clone())),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            16,
        );

        Fixture {
            store,
            tracker,
            alice,
            bob,
            carol,
        }
    }

    /// Marker storage whose conversation disappeared after the membership check.
    struct VanishedConversation;

    #[async_trait::async_trait]
    impl ReadMarkerStore for VanishedConversation {
        async fn advance(&self, _: &str, _: i64, _: i64) -> ChatResult<bool> {
            Ok(false)
        }

        async fn get(&self, _: &str, _: i64) -> ChatResult<Option<ReadMarker>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn conversation_removed_mid_call_is_not_found() {
        let f = fixture().await;
        f.store.add_message("C1", f.bob, "hello world").await.unwrap();
        let tracker = ReadStateTracker::new(
            ParticipantRegistry::new(Arc::new(f.store.clone())),
            Arc::new(f.store.clone()),
            Arc::new(VanishedConversation),
            16,
        );
        let mut events = tracker.subscribe();

        let err = tracker.mark_read("C1", f.alice, None).await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound { ref id } if id == "C1"));
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn first_mark_read_uses_latest_message() {
        let f = fixture().await;
        f.store.add_message("C1", f.bob, "hello world").await.unwrap();
        let latest = f.store.add_message("C1", f.bob, "anyone?").await.unwrap();

        let marker = f.tracker.mark_read("C1", f.alice, None).await.unwrap().unwrap();
        assert_eq!(marker.last_read_message_id, latest.sequence);
        assert_eq!(marker.conversation_id, "C1");
    }

    #[tokio::test]
    async fn non_participant_is_denied() {
        let f = fixture().await;
        let message = f.store.add_message("C1", f.bob, "secret").await.unwrap();

        for up_to in [None, Some(message.sequence)] {
            let err = f.tracker.mark_read("C1", f.carol, up_to).await.unwrap_err();
            assert!(matches!(err, ChatError::AccessDenied { .. }));
        }
        assert!(f.store.get("C1", f.carol).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_conversation_and_message_are_not_found() {
        let f = fixture().await;
        let err = f.tracker.mark_read("C9", f.alice, None).await.unwrap_err();
        assert!(matches!(err, ChatError::ConversationNotFound { .. }));

        let err = f.tracker.mark_read("C1", f.alice, Some(404)).await.unwrap_err();
        assert!(matches!(err, ChatError::MessageNotFound { .. }));
    }

    #[tokio::test]
    async fn message_from_another_conversation_is_not_found() {
        let f = fixture().await;
        f.store.add_conversation("C2", &[f.bob]).await;
        let foreign = f.store.add_message("C2", f.bob, "elsewhere").await.unwrap();

        let err = f
            .tracker
            .mark_read("C1", f.alice, Some(foreign.sequence))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MessageNotFound { .. }));
    }

    #[tokio::test]
    async fn marker_never_moves_backwards() {
        let f = fixture().await;
        let first = f.store.add_message("C1", f.bob, "one").await.unwrap();
        let second = f.store.add_message("C1", f.bob, "two").await.unwrap();
        let third = f.store.add_message("C1", f.bob, "three").await.unwrap();

        f.tracker.mark_read("C1", f.alice, Some(second.sequence)).await.unwrap();
        let marker = f
            .tracker
            .mark_read("C1", f.alice, Some(first.sequence))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker.last_read_message_id, second.sequence);

        let marker = f
            .tracker
            .mark_read("C1", f.alice, Some(third.sequence))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(marker.last_read_message_id, third.sequence);

        let marker = f.tracker.mark_read("C1", f.alice, Some(third.sequence)).await.unwrap().unwrap();
        assert_eq!(marker.last_read_message_id, third.sequence);
    }

    #[tokio::test]
    async fn empty_conversation_without_target_is_a_no_op() {
        let f = fixture().await;
        assert!(f.tracker.mark_read("C1", f.alice, None).await.unwrap().is_none());
        assert!(f.tracker.marker("C1", f.alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_positive_target_is_invalid() {
        let f = fixture().await;
        let err = f.tracker.mark_read("C1", f.alice, Some(0)).await.unwrap_err();
        assert!(matches!(err, ChatError::InvalidArgument { .. }));
        assert_eq!(f.store.store_calls(), 0);
    }

    #[tokio::test]
    async fn events_only_when_marker_advances() {
        let f = fixture().await;
        let mut events = f.tracker.subscribe();
        let first = f.store.add_message("C1", f.bob, "one").await.unwrap();
        let second = f.store.add_message("C1", f.bob, "two").await.unwrap();

        f.tracker.mark_read("C1", f.alice, Some(second.sequence)).await.unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event.conversation_id, "C1");
        assert_eq!(event.user_id, f.alice);
        assert_eq!(event.last_read_message_id, second.sequence);

        f.tracker.mark_read("C1", f.alice, Some(first.sequence)).await.unwrap();
        f.tracker.mark_read("C1", f.alice, None).await.unwrap();
        assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn unread_count_excludes_own_messages() {
        let f = fixture().await;
        let hello = f.store.add_message("C1", f.bob, "hello").await.unwrap();
        f.store.add_message("C1", f.alice, "hi bob").await.unwrap();
        f.store.add_message("C1", f.bob, "how are you").await.unwrap();

        let summary = f.tracker.unread_count("C1", f.alice).await.unwrap();
        assert_eq!(summary.unread_count, 2);
        assert_eq!(summary.last_read_message_id, None);

        f.tracker.mark_read("C1", f.alice, Some(hello.sequence)).await.unwrap();
        let summary = f.tracker.unread_count("C1", f.alice).await.unwrap();
        assert_eq!(summary.unread_count, 1);
        assert_eq!(summary.last_read_message_id, Some(hello.sequence));

        f.tracker.mark_read("C1", f.alice, None).await.unwrap();
        assert_eq!(f.tracker.unread_count("C1", f.alice).await.unwrap().unread_count, 0);

        let err = f.tracker.unread_count("C1", f.carol).await.unwrap_err();
        assert!(matches!(err, ChatError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn concurrent_marks_settle_on_maximum() {
        let f = fixture().await;
        let mut sequences = Vec::new();
        for i in 0..20 {
            let message = f.store.add_message("C1", f.bob, &format!("m{i}")).await.unwrap();
            sequences.push(message.sequence);
        }
        let max = *sequences.iter().max().unwrap();

        let mut handles = Vec::new();
        for sequence in sequences.into_iter().rev() {
            let tracker = f.tracker.clone();
            let alice = f.alice;
            handles.push(tokio::spawn(async move {
                tracker.mark_read("C1", alice, Some(sequence)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let marker = f.tracker.marker("C1", f.alice).await.unwrap().unwrap();
        assert_eq!(marker.last_read_message_id, max);
    }
}
