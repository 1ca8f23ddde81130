//! Conversation module - messages, per-service threads and inbox grouping.

mod events;
mod grouper;
mod message;
mod thread;

pub use events::ConversationEvent;
pub use grouper::{group_threads, Conversation, RelatedThread};
pub use message::{Message, MessageKind};
pub use thread::Thread;
