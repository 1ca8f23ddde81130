use async_trait::async_trait;

use crate::domain::engagement::Engagement;
use crate::domain::foundation::{
    DomainError, EngagementId, ErrorCode, ListingId, MessageId, UserId,
};
use crate::ports::EngagementRepository;

use super::InMemoryDocumentStore;

#[async_trait]
impl EngagementRepository for InMemoryDocumentStore {
    async fn insert(&self, engagement: &Engagement) -> Result<(), DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let duplicate = data.engagements.values().any(|e| {
            e.status.is_open()
                && e.client_id == engagement.client_id
                && e.listing_id == engagement.listing_id
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!(
                    "Client {} already has an open engagement on listing {}",
                    engagement.client_id, engagement.listing_id
                ),
            )
            .with_detail("listing_id", engagement.listing_id.to_string()));
        }
        data.engagements
            .insert(engagement.id.clone(), engagement.clone());
        Ok(())
    }

    async fn update(
        &self,
        engagement: &Engagement,
        expected: &Engagement,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        match data.engagements.get_mut(&engagement.id) {
            Some(stored)
                if stored.status != expected.status || stored.revision != expected.revision =>
            {
                Err(DomainError::new(
                    ErrorCode::AlreadyProcessed,
                    format!(
                        "Engagement {} changed concurrently and is now {}",
                        engagement.id, stored.status
                    ),
                )
                .with_detail("engagement_id", engagement.id.to_string())
                .with_detail("status", stored.status.to_string()))
            }
            Some(stored) => {
                *stored = engagement.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::EngagementNotFound,
                format!("Engagement not found: {}", engagement.id),
            )),
        }
    }

    async fn find_by_id(&self, id: &EngagementId) -> Result<Option<Engagement>, DomainError> {
        self.check_available()?;
        Ok(self.data.read().await.engagements.get(id).cloned())
    }

    async fn find_open(
        &self,
        client_id: &UserId,
        listing_id: &ListingId,
    ) -> Result<Option<Engagement>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .engagements
            .values()
            .find(|e| e.status.is_open() && &e.client_id == client_id && &e.listing_id == listing_id)
            .cloned())
    }

    async fn open_between(
        &self,
        client_id: &UserId,
        provider_id: &UserId,
    ) -> Result<Vec<Engagement>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        let mut open: Vec<Engagement> = data
            .engagements
            .values()
            .filter(|e| {
                e.status.is_open() && &e.client_id == client_id && &e.provider_id == provider_id
            })
            .cloned()
            .collect();
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(open)
    }

    async fn find_by_payment_message(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Engagement>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .engagements
            .values()
            .find(|e| e.holds_payment_message(message_id))
            .cloned())
    }
}
