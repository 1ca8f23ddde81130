//! EventSubscriber port - Interface for subscribing to domain events.
//!
//! This port defines how handlers register interest in domain events
//! without knowing about the underlying transport mechanism.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Implementations should be:
/// - **Idempotent** - Safe to call multiple times with same event
/// - **Quick** - Long operations should be queued for async processing
/// - **Isolated** - Errors don't affect other handlers
///
/// # Example
///
/// ```ignore
/// struct InboxRefresher { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for InboxRefresher {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let payload: ConversationEvent = event.payload_as()?;
///         // Fold into the inbox snapshot...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "InboxRefresher"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    ///
    /// This method should be idempotent - calling it multiple times
    /// with the same event should produce the same result.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging, e.g. "InboxRefresher: failed to update".
    fn name(&self) -> &'static str;
}

/// Handle returned by `subscribe`, used to release the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Port for subscribing to domain events.
///
/// Handlers register interest in specific event types and are invoked
/// when matching events are published.
///
/// # Example
///
/// ```ignore
/// let id = subscriber.subscribe("conversation.thread_updated", inbox_refresher);
/// subscriber.subscribe_all(&["notification.created", "notification.read"], prompt_view);
/// subscriber.unsubscribe(id);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    ///
    /// The handler will be invoked for every event matching the given type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> SubscriptionId;

    /// Subscribe handler to multiple event types under one registration.
    ///
    /// The same handler instance is invoked for any matching event type.
    fn subscribe_all(
        &self,
        event_types: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId;

    /// Removes a registration. No handler of it runs for events published
    /// afterwards. Returns false if it was already removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Combined trait for event bus implementations.
///
/// An EventBus provides both publishing and subscribing capabilities.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

// Blanket implementation - any type that implements both traits is an EventBus
impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _accepts_handler(_: &dyn EventHandler) {}
        fn _accepts_subscriber(_: &dyn EventSubscriber) {}
    }

    #[test]
    fn subscription_ids_compare_by_value() {
        assert_eq!(SubscriptionId(3), SubscriptionId(3));
        assert_ne!(SubscriptionId(3), SubscriptionId(4));
    }
}
