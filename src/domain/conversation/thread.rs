//! Per-service message thread summary.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, ListingId, ThreadId, Timestamp, UserId};

use super::Message;

/// Summary document for one (client, provider, service) thread.
///
/// Created on the first message and updated on every append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    pub participants: [UserId; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ListingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_title: Option<String>,
    #[serde(default)]
    pub last_message_text: String,
    pub last_message_time: Timestamp,
    pub created_at: Timestamp,
}

impl Thread {
    /// Opens a thread between two users about an optional listing.
    pub fn open(
        a: UserId,
        b: UserId,
        service_id: Option<ListingId>,
        service_title: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: ThreadId::for_service(&a, &b, service_id.as_ref()),
            participants: [a, b],
            service_id,
            service_title,
            last_message_text: String::new(),
            last_message_time: now,
            created_at: now,
        }
    }

    /// Sorted-pair id of the logical contact this thread belongs to.
    pub fn conversation_id(&self) -> ConversationId {
        ConversationId::for_pair(&self.participants[0], &self.participants[1])
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// The participant that is not `user_id`, or `None` if the user is not in
    /// this thread.
    pub fn other_participant(&self, user_id: &UserId) -> Option<&UserId> {
        match &self.participants {
            [a, b] if a == user_id => Some(b),
            [a, b] if b == user_id => Some(a),
            _ => None,
        }
    }

    /// Clamps a proposed message time so the thread never moves backwards.
    pub fn next_message_time(&self, proposed: Timestamp) -> Timestamp {
        proposed.max(self.last_message_time)
    }

    /// Folds an appended message into the summary.
    pub fn record(&mut self, message: &Message) {
        self.last_message_text = message.text.clone();
        self.last_message_time = self
            .last_message_time
            .max(message.timestamp.instant_or_now());
    }
}
