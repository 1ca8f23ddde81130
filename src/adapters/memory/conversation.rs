use async_trait::async_trait;

use crate::domain::conversation::{Message, Thread};
use crate::domain::foundation::{DomainError, MessageId, RawDate, ThreadId, UserId};
use crate::ports::{AppendedMessage, ConversationRepository};

use super::InMemoryDocumentStore;

#[async_trait]
impl ConversationRepository for InMemoryDocumentStore {
    async fn append_message(
        &self,
        mut message: Message,
        service_title: Option<String>,
    ) -> Result<AppendedMessage, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let proposed = message.timestamp.instant_or_now();

        let thread_created = !data.threads.contains_key(&message.conversation_id);
        let thread = data
            .threads
            .entry(message.conversation_id.clone())
            .or_insert_with(|| {
                let mut thread = Thread::open(
                    message.sender_id.clone(),
                    message.receiver_id.clone(),
                    message.service_id.clone(),
                    service_title.clone(),
                );
                thread.id = message.conversation_id.clone();
                thread.created_at = proposed;
                thread.last_message_time = proposed;
                thread
            });

        if thread.service_title.is_none() {
            thread.service_title = service_title;
        }
        if thread.service_id.is_none() {
            thread.service_id = message.service_id.clone();
        }

        message.timestamp = RawDate::Native(thread.next_message_time(proposed));
        thread.record(&message);
        let thread = thread.clone();

        data.messages.push(message.clone());
        Ok(AppendedMessage {
            message,
            thread,
            thread_created,
        })
    }

    async fn find_message(&self, id: &MessageId) -> Result<Option<Message>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data.messages.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_thread(&self, id: &ThreadId) -> Result<Option<Thread>, DomainError> {
        self.check_available()?;
        Ok(self.data.read().await.threads.get(id).cloned())
    }

    async fn threads_for_user(&self, user_id: &UserId) -> Result<Vec<Thread>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        let mut threads: Vec<Thread> = data
            .threads
            .values()
            .filter(|t| t.has_participant(user_id))
            .cloned()
            .collect();
        // Stable input order for the grouper's first-seen rule.
        threads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(threads)
    }

    async fn messages_in_thread(&self, thread_id: &ThreadId) -> Result<Vec<Message>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        let mut messages: Vec<Message> = data
            .messages
            .iter()
            .filter(|m| &m.conversation_id == thread_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp.instant_or_now());
        Ok(messages)
    }

    async fn messages_for_user(&self, user_id: &UserId) -> Result<Vec<Message>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .messages
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ListingId, Timestamp};

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn thread_id() -> ThreadId {
        ThreadId::for_service(&user("alice"), &user("bob"), Some(&ListingId::new("L1").unwrap()))
    }

    fn system_message(text: &str) -> Message {
        Message::system(
            thread_id(),
            user("alice"),
            user("bob"),
            text,
            Some(ListingId::new("L1").unwrap()),
        )
    }

    #[tokio::test]
    async fn first_message_creates_thread() {
        let store = InMemoryDocumentStore::new();

        let appended = store
            .append_message(system_message("hello"), Some("Plumbing".to_string()))
            .await
            .unwrap();

        assert!(appended.thread_created);
        assert_eq!(appended.thread.id, thread_id());
        assert_eq!(appended.thread.service_title.as_deref(), Some("Plumbing"));
        assert_eq!(appended.thread.last_message_text, "hello");
        assert_eq!(
            store.find_thread(&thread_id()).await.unwrap(),
            Some(appended.thread)
        );
    }

    #[tokio::test]
    async fn later_messages_reuse_thread() {
        let store = InMemoryDocumentStore::new();
        store.append_message(system_message("one"), None).await.unwrap();

        let appended = store.append_message(system_message("two"), None).await.unwrap();

        assert!(!appended.thread_created);
        assert_eq!(store.messages_in_thread(&thread_id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stored_timestamps_never_precede_thread_time() {
        let store = InMemoryDocumentStore::new();
        let first = store.append_message(system_message("now"), None).await.unwrap();

        let mut stale = system_message("from the past");
        stale.timestamp = Timestamp::now().minus_days(3).into();
        let appended = store.append_message(stale, None).await.unwrap();

        let stored_at = appended.message.timestamp.resolve().unwrap();
        assert!(stored_at >= first.thread.last_message_time);
        assert_eq!(appended.thread.last_message_time, stored_at);
    }

    #[tokio::test]
    async fn threads_for_user_only_returns_participating_threads() {
        let store = InMemoryDocumentStore::new();
        store.append_message(system_message("hi"), None).await.unwrap();
        let other = Message::plain(
            ThreadId::for_service(&user("carol"), &user("dave"), None),
            user("carol"),
            user("dave"),
            "hey",
        );
        store.append_message(other, None).await.unwrap();

        assert_eq!(store.threads_for_user(&user("alice")).await.unwrap().len(), 1);
        assert_eq!(store.threads_for_user(&user("bob")).await.unwrap().len(), 1);
        assert!(store.threads_for_user(&user("erin")).await.unwrap().is_empty());
        assert_eq!(store.messages_for_user(&user("dave")).await.unwrap().len(), 1);
    }
}
