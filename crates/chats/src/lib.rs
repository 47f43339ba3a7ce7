//! # Parlor Chats Crate
//!
//! Conversation read state, message access and scoped search.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (Conversation, Message, ReadMarker, Notification)
//! - **Repositories**: Storage ports plus SQLite and in-memory adapters
//! - **Services**: Participant registry, read-state tracker, message accessor,
//!   search engine, notification read-all
//! - **Types**: Error taxonomy and events
//! - **Utils**: Input validation and text matching
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(pool: sqlx::SqlitePool) -> parlor_chats::ChatResult<()> {
//! use parlor_chats::{ChatServices, SearchQuery};
//! use parlor_config::MessagingConfig;
//!
//! let services = ChatServices::sqlite(pool, &MessagingConfig::default());
//! let hits = services.search.search(1, &SearchQuery::new("hello")).await?;
//! services.read_state.mark_read("conversation-id", 1, None).await?;
//! # let _ = hits;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod repositories;
pub mod services;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use entities::{Conversation, Message, Notification, ReadMarker, UnreadSummary};
pub use repositories::{
    ConversationRepository, InMemoryStore, MessageRepository, MessageStore, NotificationRepository,
    NotificationStore, ParticipantDirectory, ReadMarkerRepository, ReadMarkerStore,
};
pub use services::{
    ChatServices, MessageAccessor, NotificationService, ParticipantRegistry, ReadStateTracker,
    SearchEngine, SearchQuery, StoragePorts,
};
pub use types::{ChatError, ChatResult, ReadEvent};
