//! Side effects shared by the command handlers.
//!
//! Everything here runs after the command's own writes have committed, so a
//! failure is logged and swallowed instead of being returned.

use tracing::warn;

use crate::domain::conversation::{ConversationEvent, Message};
use crate::domain::foundation::{DomainError, SerializableDomainEvent, Timestamp};
use crate::domain::notification::{Notification, NotificationEvent};
use crate::ports::{AppendedMessage, ConversationRepository, EventPublisher, NotificationRepository};

/// Publishes one event. Failures are logged.
pub(crate) async fn publish_event<E: SerializableDomainEvent>(
    publisher: &dyn EventPublisher,
    event: &E,
) {
    let envelope = match event.to_envelope() {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(event_type = event.event_type(), error = %e, "failed to build event envelope");
            return;
        }
    };
    if let Err(e) = publisher.publish(envelope).await {
        warn!(event_type = event.event_type(), error = %e, "failed to publish event");
    }
}

/// Appends a message and announces the updated thread.
pub(crate) async fn append_and_announce(
    conversations: &dyn ConversationRepository,
    publisher: &dyn EventPublisher,
    message: Message,
    service_title: Option<String>,
) -> Result<AppendedMessage, DomainError> {
    let appended = conversations.append_message(message, service_title).await?;
    publish_event(
        publisher,
        &ConversationEvent::ThreadUpdated {
            thread: appended.thread.clone(),
            occurred_at: Timestamp::now(),
        },
    )
    .await;
    Ok(appended)
}

/// Posts a workflow notice. A failed append is logged.
pub(crate) async fn post_system_message(
    conversations: &dyn ConversationRepository,
    publisher: &dyn EventPublisher,
    message: Message,
    service_title: Option<String>,
) -> Option<Message> {
    let thread_id = message.conversation_id.clone();
    match append_and_announce(conversations, publisher, message, service_title).await {
        Ok(appended) => Some(appended.message),
        Err(e) => {
            warn!(thread_id = %thread_id, error = %e, "failed to post system message");
            None
        }
    }
}

/// Stores a notification and announces it. A failed create is logged.
pub(crate) async fn notify(
    notifications: &dyn NotificationRepository,
    publisher: &dyn EventPublisher,
    notification: Notification,
) -> Option<Notification> {
    if let Err(e) = notifications.create(&notification).await {
        warn!(
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            error = %e,
            "failed to create notification"
        );
        return None;
    }
    publish_event(
        publisher,
        &NotificationEvent::Created {
            notification: notification.clone(),
            occurred_at: Timestamp::now(),
        },
    )
    .await;
    Some(notification)
}
