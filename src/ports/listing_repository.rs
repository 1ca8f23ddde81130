//! Listing repository port.
//!
//! Reservation changes are compare-and-set operations executed by the store,
//! never read-then-write in the caller.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ListingId, UserId};
use crate::domain::listing::ServiceListing;

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Inserts or replaces a listing.
    async fn save(&self, listing: &ServiceListing) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<ServiceListing>, DomainError>;

    /// Reserves the listing for `client_id` if it is unreserved or already
    /// reserved by that client.
    ///
    /// # Errors
    ///
    /// - `ListingNotFound` if the listing does not exist
    /// - `ListingUnavailable` if another client holds it; nothing changes
    async fn try_reserve(
        &self,
        id: &ListingId,
        client_id: &UserId,
    ) -> Result<ServiceListing, DomainError>;

    /// Clears the reservation and keeps the listing active.
    async fn release(&self, id: &ListingId) -> Result<ServiceListing, DomainError>;

    /// Deactivates the listing.
    async fn retire(&self, id: &ListingId) -> Result<ServiceListing, DomainError>;

    /// All listings owned by a provider.
    async fn find_by_provider(&self, provider_id: &UserId)
        -> Result<Vec<ServiceListing>, DomainError>;
}
