//! Live subscription: a projection attached to the event bus.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::{EventHandler, EventSubscriber, SubscriptionId};

use super::Projection;

/// Keeps a projection's snapshot current until released.
///
/// Releasing is idempotent and also happens on drop. Once `release`
/// returns, no further event reaches the snapshot, even one already being
/// delivered by the bus.
pub struct LiveSubscription<P: Projection> {
    subscriber: Arc<dyn EventSubscriber>,
    subscription: Mutex<Option<SubscriptionId>>,
    handler: Arc<ProjectionHandler<P>>,
    receiver: watch::Receiver<P::Snapshot>,
}

impl<P: Projection> LiveSubscription<P> {
    pub fn start(subscriber: Arc<dyn EventSubscriber>, projection: P, initial: P::Snapshot) -> Self {
        let (sender, receiver) = watch::channel(initial);
        let handler = Arc::new(ProjectionHandler {
            projection,
            sender,
            active: AtomicBool::new(true),
        });
        let id = subscriber.subscribe_all(P::EVENT_TYPES, handler.clone());
        debug!(subscription = id.0, event_types = ?P::EVENT_TYPES, "live view started");

        Self {
            subscriber,
            subscription: Mutex::new(Some(id)),
            handler,
            receiver,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> P::Snapshot {
        self.receiver.borrow().clone()
    }

    /// A receiver notified on every snapshot change.
    pub fn receiver(&self) -> watch::Receiver<P::Snapshot> {
        self.receiver.clone()
    }

    pub fn is_active(&self) -> bool {
        self.handler.active.load(Ordering::Acquire)
    }

    /// Stops updates and unsubscribes. Returns false if already released.
    pub fn release(&self) -> bool {
        let Some(id) = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        else {
            return false;
        };

        // Taking the channel's write lock orders this after any in-flight update.
        self.handler.sender.send_if_modified(|_| {
            self.handler.active.store(false, Ordering::Release);
            false
        });
        self.subscriber.unsubscribe(id);
        debug!(subscription = id.0, "live view released");
        true
    }
}

impl<P: Projection> Drop for LiveSubscription<P> {
    fn drop(&mut self) {
        self.release();
    }
}

struct ProjectionHandler<P: Projection> {
    projection: P,
    sender: watch::Sender<P::Snapshot>,
    active: AtomicBool,
}

#[async_trait]
impl<P: Projection> EventHandler for ProjectionHandler<P> {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.sender.send_if_modified(|current| {
            if !self.active.load(Ordering::Acquire) {
                return false;
            }
            match self.projection.reduce(current, &event) {
                Some(next) => {
                    *current = next;
                    true
                }
                None => false,
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "LiveSubscription"
    }
}
