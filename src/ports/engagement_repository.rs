//! Engagement repository port.

use async_trait::async_trait;

use crate::domain::engagement::Engagement;
use crate::domain::foundation::{DomainError, EngagementId, ListingId, MessageId, UserId};

#[async_trait]
pub trait EngagementRepository: Send + Sync {
    /// Inserts a new engagement.
    ///
    /// # Errors
    ///
    /// - `AlreadyProcessed` if an open engagement already exists for the
    ///   same client and listing
    async fn insert(&self, engagement: &Engagement) -> Result<(), DomainError>;

    /// Replaces a stored engagement if the stored record still has the
    /// status and revision of `expected`, the version the caller read.
    ///
    /// # Errors
    ///
    /// - `EngagementNotFound` if it was never inserted
    /// - `AlreadyProcessed` if another command changed it first; nothing changes
    async fn update(&self, engagement: &Engagement, expected: &Engagement)
        -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &EngagementId) -> Result<Option<Engagement>, DomainError>;

    /// The client's open engagement on a listing, if any.
    async fn find_open(
        &self,
        client_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Option<Engagement>, DomainError>;

    /// Open engagements between a client and a provider, oldest first.
    async fn open_between(
        &self,
        client_id: &UserId,
        provider_id: &UserId,
    ) -> Result<Vec<Engagement>, DomainError>;

    /// The engagement a payment proof message was submitted for, whether it
    /// is the current proof or a superseded one.
    async fn find_by_payment_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Engagement>, DomainError>;
}
