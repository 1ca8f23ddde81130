//! In-memory document store.
//!
//! One `InMemoryDocumentStore` implements every store port. All collections
//! sit behind a single `tokio::sync::RwLock`, and each port operation runs
//! under one guard, so compare-and-set and the payment confirmation unit are
//! atomic with respect to every other operation.
//!
//! - `listing` - `ListingRepository`
//! - `conversation` - `ConversationRepository`
//! - `engagement` - `EngagementRepository`
//! - `payment` - `PaymentLedger`
//! - `notification` - `NotificationRepository`
//! - `review` - `ReviewRepository`

mod conversation;
mod engagement;
mod listing;
mod notification;
mod payment;
mod review;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::snapshot::Snapshot;
use crate::domain::conversation::{Message, Thread};
use crate::domain::engagement::Engagement;
use crate::domain::foundation::{DomainError, EngagementId, ListingId, ThreadId, UserId};
use crate::domain::listing::ServiceListing;
use crate::domain::notification::Notification;
use crate::domain::payment::{ProviderStats, Transaction};
use crate::domain::review::Review;

#[derive(Debug, Default)]
struct Collections {
    listings: HashMap<ListingId, ServiceListing>,
    threads: HashMap<ThreadId, Thread>,
    /// Append order.
    messages: Vec<Message>,
    engagements: HashMap<EngagementId, Engagement>,
    transactions: Vec<Transaction>,
    stats: HashMap<UserId, ProviderStats>,
    notifications: Vec<Notification>,
    reviews: Vec<Review>,
}

/// Document store kept in process memory.
///
/// Cloning shares the underlying collections.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryDocumentStore::new());
/// store.save(&listing).await?;
/// let reserved = store.try_reserve(&listing.id, &client_id).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    data: Arc<RwLock<Collections>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let collections = Collections {
            listings: snapshot
                .listings
                .into_iter()
                .map(|l| (l.id.clone(), l))
                .collect(),
            threads: snapshot
                .threads
                .into_iter()
                .map(|t| (t.id.clone(), t))
                .collect(),
            messages: snapshot.messages,
            transactions: snapshot.transactions,
            notifications: snapshot.notifications,
            ..Collections::default()
        };
        Self {
            data: Arc::new(RwLock::new(collections)),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// While set, every operation fails with `StoreUnavailable` and changes
    /// nothing.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable("Document store is unavailable"));
        }
        Ok(())
    }

    /// Number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.data.read().await.messages.len()
    }

    /// Number of stored notifications.
    pub async fn notification_count(&self) -> usize {
        self.data.read().await.notifications.len()
    }

    /// Number of stored transactions.
    pub async fn transaction_count(&self) -> usize {
        self.data.read().await.transactions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ErrorCode, Money};
    use crate::ports::ListingRepository;

    #[tokio::test]
    async fn from_snapshot_indexes_listings_and_threads() {
        let listing = ServiceListing::new(
            ListingId::new("L1").unwrap(),
            UserId::new("bob").unwrap(),
            "Plumbing",
            Money::from_major(1000),
        );
        let store = InMemoryDocumentStore::from_snapshot(Snapshot {
            listings: vec![listing.clone()],
            ..Snapshot::default()
        });

        let found = store.find_by_id(&listing.id).await.unwrap();

        assert_eq!(found, Some(listing));
    }

    #[tokio::test]
    async fn unavailable_store_rejects_operations() {
        let store = InMemoryDocumentStore::new();
        store.set_unavailable(true);

        let err = store
            .find_by_id(&ListingId::new("L1").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::StoreUnavailable);
    }

    #[tokio::test]
    async fn clones_share_collections() {
        let store = InMemoryDocumentStore::new();
        let clone = store.clone();
        let listing = ServiceListing::new(
            ListingId::new("L1").unwrap(),
            UserId::new("bob").unwrap(),
            "Plumbing",
            Money::from_major(1000),
        );

        clone.save(&listing).await.unwrap();

        assert!(store.find_by_id(&listing.id).await.unwrap().is_some());
    }
}
