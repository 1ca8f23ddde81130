//! SubmitReviewHandler - Command handler for a client's star rating.

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::handlers::support::publish_event;
use crate::domain::engagement::EngagementError;
use crate::domain::foundation::{NotificationId, Rating, Timestamp, TransactionId, UserId};
use crate::domain::notification::{types, NotificationEvent};
use crate::domain::review::Review;
use crate::ports::{EventPublisher, NotificationRepository, PaymentLedger, ReviewRepository};

const PROMPT_SCAN_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct SubmitReviewCommand {
    /// The rating client.
    pub actor_id: UserId,
    pub transaction_id: TransactionId,
    /// 1 to 5.
    pub stars: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitReviewResult {
    pub review: Review,
    /// Prompts for this transaction that were still unread.
    pub consumed_prompts: Vec<NotificationId>,
}

pub struct SubmitReviewHandler {
    ledger: Arc<dyn PaymentLedger>,
    reviews: Arc<dyn ReviewRepository>,
    notifications: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl SubmitReviewHandler {
    pub fn new(
        ledger: Arc<dyn PaymentLedger>,
        reviews: Arc<dyn ReviewRepository>,
        notifications: Arc<dyn NotificationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            ledger,
            reviews,
            notifications,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitReviewCommand,
    ) -> Result<SubmitReviewResult, EngagementError> {
        // 1. Input
        let rating = Rating::new(cmd.stars)?;

        // 2. The reviewed payment
        let transaction = self
            .ledger
            .transactions_for_user(&cmd.actor_id)
            .await?
            .into_iter()
            .find(|t| t.id == cmd.transaction_id)
            .ok_or_else(|| {
                EngagementError::not_found(
                    "Transaction",
                    format!("Transaction {}", cmd.transaction_id),
                )
            })?;
        if transaction.client_id != cmd.actor_id {
            return Err(EngagementError::authorization(
                "Only the paying client may review this transaction",
            ));
        }
        if !transaction.status.is_accepted() {
            return Err(EngagementError::InvalidState(format!(
                "Transaction {} is {} and cannot be reviewed yet",
                transaction.id, transaction.status
            )));
        }
        let service_id = transaction.service_id.clone().ok_or_else(|| {
            EngagementError::validation(
                "transaction_id",
                format!("Transaction {} has no service to review", transaction.id),
            )
        })?;

        // 3. One review per transaction and rater
        let review = Review::new(
            cmd.actor_id.clone(),
            transaction.provider_id.clone(),
            service_id,
            transaction.id.clone(),
            rating,
            cmd.comment,
        )?;
        self.reviews.insert(&review).await?;

        info!(
            review_id = %review.id,
            transaction_id = %review.transaction_id,
            target_id = %review.target_id,
            stars = review.rating.stars(),
            "review submitted"
        );

        // 4. Retire the matching prompt
        let consumed_prompts = self.consume_prompts(&cmd.actor_id, &transaction.id).await;

        Ok(SubmitReviewResult {
            review,
            consumed_prompts,
        })
    }

    async fn consume_prompts(
        &self,
        client_id: &UserId,
        transaction_id: &TransactionId,
    ) -> Vec<NotificationId> {
        let unread = match self
            .notifications
            .unread_of_type(client_id, types::PAYMENT_CONFIRMED_RATING, PROMPT_SCAN_LIMIT)
            .await
        {
            Ok(unread) => unread,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "failed to read rating prompts");
                return Vec::new();
            }
        };

        let mut consumed = Vec::new();
        for prompt in unread
            .iter()
            .filter(|n| n.payload_str("transactionId") == Some(transaction_id.as_str()))
        {
            match self.notifications.mark_read(&prompt.id).await {
                Ok(_) => {
                    publish_event(
                        self.event_publisher.as_ref(),
                        &NotificationEvent::Read {
                            notification_id: prompt.id.clone(),
                            user_id: client_id.clone(),
                            occurred_at: Timestamp::now(),
                        },
                    )
                    .await;
                    consumed.push(prompt.id.clone());
                }
                Err(e) => {
                    warn!(notification_id = %prompt.id, error = %e, "failed to consume rating prompt");
                }
            }
        }
        consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{user, Fixture};

    fn review(actor: &str, tx: &TransactionId, stars: u8) -> SubmitReviewCommand {
        SubmitReviewCommand {
            actor_id: user(actor),
            transaction_id: tx.clone(),
            stars,
            comment: Some("  Fixed the leak quickly  ".to_string()),
        }
    }

    #[tokio::test]
    async fn review_is_stored_and_prompt_consumed() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let engagement = fx.confirmed("alice", "L1").await;
        let tx = engagement.transaction_id.unwrap();

        let result = fx.review_handler().handle(review("alice", &tx, 5)).await.unwrap();

        assert_eq!(result.review.target_id, user("bob"));
        assert_eq!(result.review.rating.stars(), 5);
        assert_eq!(result.review.comment.as_deref(), Some("Fixed the leak quickly"));
        assert_eq!(result.consumed_prompts.len(), 1);
        assert!(fx.unread_prompts("alice").await.is_empty());
    }

    #[tokio::test]
    async fn second_review_is_already_processed() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let tx = fx.confirmed("alice", "L1").await.transaction_id.unwrap();
        let handler = fx.review_handler();
        handler.handle(review("alice", &tx, 4)).await.unwrap();

        let err = handler.handle(review("alice", &tx, 1)).await.unwrap_err();

        assert!(matches!(err, EngagementError::AlreadyProcessed(_)));
    }

    #[tokio::test]
    async fn provider_cannot_review_own_payment() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let tx = fx.confirmed("alice", "L1").await.transaction_id.unwrap();

        let err = fx.review_handler().handle(review("bob", &tx, 5)).await.unwrap_err();

        assert!(matches!(err, EngagementError::Authorization(_)));
    }

    #[tokio::test]
    async fn pending_transaction_cannot_be_reviewed() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let submitted = fx.submitted("alice", "L1").await;

        let err = fx
            .review_handler()
            .handle(review("alice", &submitted.transaction.id, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, EngagementError::InvalidState(_)));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let fx = Fixture::new();
        fx.listing("L1", "bob", "Plumbing", 1000).await;
        let tx = fx.confirmed("alice", "L1").await.transaction_id.unwrap();

        let err = fx.review_handler().handle(review("alice", &tx, 6)).await.unwrap_err();

        assert!(matches!(err, EngagementError::Validation { .. }));
    }
}
