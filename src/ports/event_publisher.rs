//! EventPublisher port - announces engagement, conversation and
//! notification events to in-process subscribers.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Handlers publish after their writes commit and treat a publish failure
/// as non-fatal: the stored state is authoritative, events only keep live
/// views current.
///
/// # Example
///
/// ```ignore
/// let envelope = EngagementEvent::Accepted { .. }.to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver one event to every subscriber of its type.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Deliver events in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_publisher_is_object_safe() {
        fn _accepts_dyn(_publisher: &dyn EventPublisher) {}
    }
}
