//! Conversation repository port.
//!
//! Owns messages and their thread summaries. Appending a message creates the
//! thread on first use and keeps thread times non-decreasing.

use async_trait::async_trait;

use crate::domain::conversation::{Message, Thread};
use crate::domain::foundation::{DomainError, MessageId, ThreadId, UserId};

/// Result of appending a message.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendedMessage {
    /// The message as stored, with its final timestamp.
    pub message: Message,
    /// The thread summary after the append.
    pub thread: Thread,
    /// True when this append opened the thread.
    pub thread_created: bool,
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Appends `message` to its thread, creating the thread when missing.
    ///
    /// The stored timestamp is never earlier than the thread's last message.
    /// `service_title` names the thread when it is created.
    async fn append_message(
        &self,
        message: Message,
        service_title: Option<String>,
    ) -> Result<AppendedMessage, DomainError>;

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, DomainError>;

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<Thread>, DomainError>;

    /// Every thread the user participates in.
    async fn threads_for_user(&self, user_id: &UserId) -> Result<Vec<Thread>, DomainError>;

    /// Messages of one thread in timestamp order.
    async fn messages_in_thread(&self, thread_id: &ThreadId) -> Result<Vec<Message>, DomainError>;

    /// Every message the user sent or received.
    async fn messages_for_user(&self, user_id: &UserId) -> Result<Vec<Message>, DomainError>;
}
