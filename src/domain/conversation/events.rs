//! Conversation events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainEvent, Timestamp};

use super::Thread;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationEvent {
    /// A thread summary was created or changed by an appended message.
    ThreadUpdated {
        thread: Thread,
        occurred_at: Timestamp,
    },
}

impl DomainEvent for ConversationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ConversationEvent::ThreadUpdated { .. } => "conversation.thread_updated",
        }
    }

    fn aggregate_id(&self) -> String {
        match self {
            ConversationEvent::ThreadUpdated { thread, .. } => thread.id.to_string(),
        }
    }

    fn aggregate_type(&self) -> &'static str {
        "Thread"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            ConversationEvent::ThreadUpdated { occurred_at, .. } => *occurred_at,
        }
    }
}
