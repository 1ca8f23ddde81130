//! Conversation grouper.
//!
//! Collapses every per-service thread a user shares with the same counterpart
//! into a single logical conversation. Grouping is keyed on the other
//! participant's id, never on the service, and no thread is ever discarded:
//! the most recently active thread becomes primary and the rest are listed as
//! related threads.
//!
//! When two threads share the same `last_message_time` the one seen first in
//! the input stays primary.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{ConversationId, ListingId, ThreadId, Timestamp, UserId};

use super::Thread;

/// Compact reference to a non-primary thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedThread {
    pub id: ThreadId,
    pub service_id: Option<ListingId>,
    pub service_title: Option<String>,
    pub last_message_time: Timestamp,
}

impl From<&Thread> for RelatedThread {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id.clone(),
            service_id: thread.service_id.clone(),
            service_title: thread.service_title.clone(),
            last_message_time: thread.last_message_time,
        }
    }
}

/// One logical contact in a user's inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub other_participant: UserId,
    pub primary_thread: Thread,
    pub related_threads: Vec<RelatedThread>,
}

impl Conversation {
    /// Total number of threads folded into this conversation.
    pub fn thread_count(&self) -> usize {
        1 + self.related_threads.len()
    }
}

/// Groups `threads` into conversations from `user_id`'s point of view.
///
/// Conversations are ordered by their primary thread's `last_message_time`,
/// newest first. Threads the user is not part of are skipped.
pub fn group_threads(user_id: &UserId, threads: &[Thread]) -> Vec<Conversation> {
    let mut order: Vec<UserId> = Vec::new();
    let mut buckets: HashMap<UserId, Vec<&Thread>> = HashMap::new();

    for thread in threads {
        let Some(other) = thread.other_participant(user_id) else {
            continue;
        };
        buckets
            .entry(other.clone())
            .or_insert_with(|| {
                order.push(other.clone());
                Vec::new()
            })
            .push(thread);
    }

    let mut conversations: Vec<Conversation> = order
        .into_iter()
        .filter_map(|other| {
            let mut group = buckets.remove(&other)?;
            // Stable sort keeps first-seen order among equal timestamps.
            group.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
            let (primary, rest) = group.split_first()?;
            Some(Conversation {
                id: ConversationId::for_pair(user_id, &other),
                other_participant: other,
                primary_thread: (*primary).clone(),
                related_threads: rest.iter().map(|t| RelatedThread::from(*t)).collect(),
            })
        })
        .collect();

    conversations.sort_by(|a, b| {
        b.primary_thread
            .last_message_time
            .cmp(&a.primary_thread.last_message_time)
    });
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn thread_at(a: &str, b: &str, listing: &str, millis: i64) -> Thread {
        let mut thread = Thread::open(
            user(a),
            user(b),
            Some(ListingId::new(listing).unwrap()),
            Some(format!("Service {}", listing)),
        );
        let at = Timestamp::from_unix_millis(millis).unwrap();
        thread.last_message_time = at;
        thread.created_at = at;
        thread
    }

    #[test]
    fn threads_with_same_counterpart_collapse_into_one_conversation() {
        let threads = vec![
            thread_at("alice", "bob", "L1", 1_000),
            thread_at("bob", "alice", "L2", 3_000),
            thread_at("alice", "bob", "L3", 2_000),
        ];

        let conversations = group_threads(&user("alice"), &threads);

        assert_eq!(conversations.len(), 1);
        let conversation = &conversations[0];
        assert_eq!(conversation.id.as_str(), "alice_bob");
        assert_eq!(conversation.other_participant, user("bob"));
        assert_eq!(conversation.primary_thread.id.as_str(), "alice_bob_L2");
        assert_eq!(conversation.related_threads.len(), 2);
        assert_eq!(conversation.related_threads[0].id.as_str(), "alice_bob_L3");
        assert_eq!(conversation.related_threads[1].id.as_str(), "alice_bob_L1");
    }

    #[test]
    fn equal_timestamps_keep_first_seen_thread_primary() {
        let threads = vec![
            thread_at("alice", "bob", "L1", 5_000),
            thread_at("alice", "bob", "L2", 5_000),
        ];

        let conversations = group_threads(&user("bob"), &threads);

        assert_eq!(conversations[0].primary_thread.id.as_str(), "alice_bob_L1");
        assert_eq!(conversations[0].related_threads[0].id.as_str(), "alice_bob_L2");
    }

    #[test]
    fn conversations_are_ordered_newest_first() {
        let threads = vec![
            thread_at("alice", "bob", "L1", 1_000),
            thread_at("alice", "carol", "L2", 9_000),
            thread_at("dave", "alice", "L3", 4_000),
        ];

        let others: Vec<String> = group_threads(&user("alice"), &threads)
            .into_iter()
            .map(|c| c.other_participant.to_string())
            .collect();

        assert_eq!(others, vec!["carol", "dave", "bob"]);
    }

    #[test]
    fn threads_without_the_user_are_ignored() {
        let threads = vec![thread_at("bob", "carol", "L1", 1_000)];
        assert!(group_threads(&user("alice"), &threads).is_empty());
    }

    #[test]
    fn empty_input_yields_no_conversations() {
        assert!(group_threads(&user("alice"), &[]).is_empty());
    }

    proptest! {
        #[test]
        fn n_threads_with_one_counterpart_keep_all_threads(times in prop::collection::vec(0i64..1_000_000, 2..12)) {
            let threads: Vec<Thread> = times
                .iter()
                .enumerate()
                .map(|(i, t)| thread_at("alice", "bob", &format!("L{}", i), *t))
                .collect();

            let conversations = group_threads(&user("alice"), &threads);

            prop_assert_eq!(conversations.len(), 1);
            prop_assert_eq!(conversations[0].related_threads.len(), threads.len() - 1);
            let newest = times.iter().max().copied().unwrap();
            prop_assert_eq!(conversations[0].primary_thread.last_message_time.as_unix_millis(), newest);
        }
    }
}
