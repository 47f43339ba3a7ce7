//! Domain entities for conversations and their read state.

pub mod conversation;
pub mod message;
pub mod notification;
pub mod read_marker;

pub use conversation::Conversation;
pub use message::Message;
pub use notification::Notification;
pub use read_marker::{ReadMarker, UnreadSummary};
