//! Review repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TransactionId, UserId};
use crate::domain::review::Review;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Stores a review.
    ///
    /// # Errors
    ///
    /// - `AlreadyProcessed` if the rater already reviewed this transaction
    async fn insert(&self, review: &Review) -> Result<(), DomainError>;

    async fn find_for_transaction(
        &self,
        transaction_id: &TransactionId,
        rater_id: &UserId,
    ) -> Result<Option<Review>, DomainError>;

    /// Reviews received by a provider.
    async fn for_target(&self, target_id: &UserId) -> Result<Vec<Review>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ReviewRepository) {}
    }
}
