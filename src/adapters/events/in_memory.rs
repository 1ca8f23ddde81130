//! In-process event bus.
//!
//! Delivers each published envelope to every live registration for its type,
//! in registration order, before `publish` returns. Published envelopes are
//! kept so tests can assert on them.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber, SubscriptionId};

struct Registration {
    id: SubscriptionId,
    event_types: HashSet<String>,
    handler: Arc<dyn EventHandler>,
}

/// In-process event bus.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// let id = bus.subscribe("conversation.thread_updated", inbox);
///
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("conversation.thread_updated"));
///
/// bus.unsubscribe(id);
/// ```
pub struct InMemoryEventBus {
    registrations: RwLock<Vec<Registration>>,
    published: RwLock<Vec<EventEnvelope>>,
    next_id: AtomicU64,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(Vec::new()),
            published: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // A handler that panicked mid-publish must not take the bus down with it.
    fn read_registrations(&self) -> RwLockReadGuard<'_, Vec<Registration>> {
        self.registrations.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_registrations(&self) -> RwLockWriteGuard<'_, Vec<Registration>> {
        self.registrations.write().unwrap_or_else(|e| e.into_inner())
    }

    fn register(&self, event_types: HashSet<String>, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write_registrations().push(Registration {
            id,
            event_types,
            handler,
        });
        id
    }

    // === Inspection Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for a specific aggregate.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Clears all published events.
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Returns count of published events.
    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Checks if a specific event type was published.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|e| e.event_type == event_type)
    }

    /// Number of live registrations.
    pub fn subscription_count(&self) -> usize {
        self.read_registrations().len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());

        // Clone handlers to release lock before await points
        let matching: Vec<Arc<dyn EventHandler>> = self
            .read_registrations()
            .iter()
            .filter(|r| r.event_types.contains(&event.event_type))
            .map(|r| Arc::clone(&r.handler))
            .collect();

        let mut errors = Vec::new();
        for handler in matching {
            if let Err(e) = handler.handle(event.clone()).await {
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        self.register(HashSet::from([event_type.to_string()]), handler)
    }

    fn subscribe_all(
        &self,
        event_types: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> SubscriptionId {
        let types = event_types.iter().map(|t| t.to_string()).collect();
        self.register(types, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.write_registrations();
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }
}
