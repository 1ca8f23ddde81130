use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, ListingId, UserId};
use crate::domain::listing::ServiceListing;
use crate::ports::ListingRepository;

use super::{Collections, InMemoryDocumentStore};

fn listing_mut<'a>(
    data: &'a mut Collections,
    id: &ListingId,
) -> Result<&'a mut ServiceListing, DomainError> {
    data.listings.get_mut(id).ok_or_else(|| {
        DomainError::new(ErrorCode::ListingNotFound, format!("Listing not found: {}", id))
            .with_detail("listing_id", id.to_string())
    })
}

#[async_trait]
impl ListingRepository for InMemoryDocumentStore {
    async fn save(&self, listing: &ServiceListing) -> Result<(), DomainError> {
        self.check_available()?;
        self.data
            .write()
            .await
            .listings
            .insert(listing.id.clone(), listing.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<ServiceListing>, DomainError> {
        self.check_available()?;
        Ok(self.data.read().await.listings.get(id).cloned())
    }

    async fn try_reserve(
        &self,
        id: &ListingId,
        client_id: &UserId,
    ) -> Result<ServiceListing, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let listing = listing_mut(&mut data, id)?;
        if !listing.active {
            return Err(DomainError::new(
                ErrorCode::ListingUnavailable,
                format!("Listing {} is no longer active", id),
            )
            .with_detail("listing_id", id.to_string()));
        }
        listing.reserve(client_id)?;
        Ok(listing.clone())
    }

    async fn release(&self, id: &ListingId) -> Result<ServiceListing, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let listing = listing_mut(&mut data, id)?;
        listing.release();
        Ok(listing.clone())
    }

    async fn retire(&self, id: &ListingId) -> Result<ServiceListing, DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let listing = listing_mut(&mut data, id)?;
        listing.retire();
        Ok(listing.clone())
    }

    async fn find_by_provider(
        &self,
        provider_id: &UserId,
    ) -> Result<Vec<ServiceListing>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        let mut listings: Vec<ServiceListing> = data
            .listings
            .values()
            .filter(|l| &l.provider_id == provider_id)
            .cloned()
            .collect();
        listings.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listings)
    }
}
