use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, TransactionId, UserId};
use crate::domain::review::Review;
use crate::ports::ReviewRepository;

use super::InMemoryDocumentStore;

#[async_trait]
impl ReviewRepository for InMemoryDocumentStore {
    async fn insert(&self, review: &Review) -> Result<(), DomainError> {
        self.check_available()?;
        let mut data = self.data.write().await;
        let duplicate = data
            .reviews
            .iter()
            .any(|r| r.transaction_id == review.transaction_id && r.rater_id == review.rater_id);
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!("Transaction {} was already reviewed", review.transaction_id),
            )
            .with_detail("transaction_id", review.transaction_id.to_string()));
        }
        data.reviews.push(review.clone());
        Ok(())
    }

    async fn find_for_transaction(
        &self,
        transaction_id: &TransactionId,
        rater_id: &UserId,
    ) -> Result<Option<Review>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .reviews
            .iter()
            .find(|r| &r.transaction_id == transaction_id && &r.rater_id == rater_id)
            .cloned())
    }

    async fn for_target(&self, target_id: &UserId) -> Result<Vec<Review>, DomainError> {
        self.check_available()?;
        let data = self.data.read().await;
        Ok(data
            .reviews
            .iter()
            .filter(|r| &r.target_id == target_id)
            .cloned()
            .collect())
    }
}
