//! Inbox view: a user's threads folded into conversations.

use std::sync::Arc;

use crate::domain::conversation::{group_threads, Conversation, ConversationEvent, Thread};
use crate::domain::foundation::{EventEnvelope, UserId};

use super::Projection;

/// Immutable inbox state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxSnapshot {
    pub user_id: UserId,
    /// Known threads in first-seen order. Grouping ties depend on it.
    threads: Arc<Vec<Thread>>,
    pub conversations: Arc<Vec<Conversation>>,
}

impl InboxSnapshot {
    pub fn threads(&self) -> &[Thread] {
        &self.threads
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxChange {
    ThreadUpserted(Thread),
}

impl InboxChange {
    /// Reads a change from a `conversation.thread_updated` envelope.
    pub fn from_event(event: &EventEnvelope) -> Option<Self> {
        match event.payload_as::<ConversationEvent>().ok()? {
            ConversationEvent::ThreadUpdated { thread, .. } => Some(InboxChange::ThreadUpserted(thread)),
        }
    }
}

/// Pure reducer over [`InboxChange`]s.
pub struct InboxView;

impl InboxView {
    pub fn initial(user_id: UserId, threads: Vec<Thread>) -> InboxSnapshot {
        let threads: Vec<Thread> = threads
            .into_iter()
            .filter(|t| t.has_participant(&user_id))
            .collect();
        let conversations = group_threads(&user_id, &threads);
        InboxSnapshot {
            user_id,
            threads: Arc::new(threads),
            conversations: Arc::new(conversations),
        }
    }

    /// Returns the snapshot after `change`. Threads the user is not part of
    /// leave the snapshot as it was.
    pub fn apply(snapshot: &InboxSnapshot, change: InboxChange) -> InboxSnapshot {
        match change {
            InboxChange::ThreadUpserted(thread) => {
                if !thread.has_participant(&snapshot.user_id) {
                    return snapshot.clone();
                }
                let mut threads = snapshot.threads.as_ref().clone();
                match threads.iter_mut().find(|t| t.id == thread.id) {
                    Some(existing) => *existing = thread,
                    None => threads.push(thread),
                }
                let conversations = group_threads(&snapshot.user_id, &threads);
                InboxSnapshot {
                    user_id: snapshot.user_id.clone(),
                    threads: Arc::new(threads),
                    conversations: Arc::new(conversations),
                }
            }
        }
    }
}

/// Keeps an [`InboxSnapshot`] current from thread events.
pub struct InboxProjection;

impl Projection for InboxProjection {
    type Snapshot = InboxSnapshot;

    const EVENT_TYPES: &'static [&'static str] = &["conversation.thread_updated"];

    fn reduce(&self, snapshot: &InboxSnapshot, event: &EventEnvelope) -> Option<InboxSnapshot> {
        let change = InboxChange::from_event(event)?;
        let next = InboxView::apply(snapshot, change);
        (next != *snapshot).then_some(next)
    }
}
