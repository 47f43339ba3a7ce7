//! Business logic layer for the conversation core.

pub mod message_accessor;
pub mod notification_service;
pub mod participant_registry;
pub mod read_state;
pub mod search_engine;

pub use message_accessor::MessageAccessor;
pub use notification_service::NotificationService;
pub use participant_registry::ParticipantRegistry;
pub use read_state::ReadStateTracker;
pub use search_engine::{SearchEngine, SearchQuery};

use std::sync::Arc;

use parlor_config::MessagingConfig;
use sqlx::SqlitePool;

use crate::repositories::{
    ConversationRepository, InMemoryStore, MessageRepository, MessageStore, NotificationRepository,
    NotificationStore, ParticipantDirectory, ReadMarkerRepository, ReadMarkerStore,
};

/// The storage ports a [`ChatServices`] bundle is built from.
#[derive(Clone)]
pub struct StoragePorts {
    pub participants: Arc<dyn ParticipantDirectory>,
    pub messages: Arc<dyn MessageStore>,
    pub markers: Arc<dyn ReadMarkerStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl StoragePorts {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            participants: Arc::new(ConversationRepository::new(pool.clone())),
            messages: Arc::new(MessageRepository::new(pool.clone())),
            markers: Arc::new(ReadMarkerRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
        }
    }

    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            participants: Arc::new(store.clone()),
            messages: Arc::new(store.clone()),
            markers: Arc::new(store.clone()),
            notifications: Arc::new(store.clone()),
        }
    }
}

/// Every service the request shell needs, wired over one set of ports.
#[derive(Clone)]
pub struct ChatServices {
    pub registry: ParticipantRegistry,
    pub read_state: ReadStateTracker,
    pub messages: MessageAccessor,
    pub search: SearchEngine,
    pub notifications: NotificationService,
}

impl ChatServices {
    pub fn new(ports: StoragePorts, config: &MessagingConfig) -> Self {
        let registry = ParticipantRegistry::new(ports.participants);

        Self {
            read_state: ReadStateTracker::new(
                registry.clone(),
                ports.messages.clone(),
                ports.markers,
                config.read_event_capacity,
            ),
            messages: MessageAccessor::new(
                registry.clone(),
                ports.messages.clone(),
                config.message_page_limit,
            ),
            search: SearchEngine::new(
                registry.clone(),
                ports.messages,
                config.search_default_limit,
                config.search_max_limit,
            ),
            notifications: NotificationService::new(ports.notifications),
            registry,
        }
    }

    pub fn sqlite(pool: SqlitePool, config: &MessagingConfig) -> Self {
        Self::new(StoragePorts::sqlite(pool), config)
    }
}
