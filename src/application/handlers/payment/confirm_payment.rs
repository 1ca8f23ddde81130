//! ConfirmPaymentHandler - Command handler for the provider's confirmation.
//!
//! The revenue-affecting writes (message flag, transaction, counters, listing
//! completions) and the engagement's move to `PaymentConfirmed` are one ledger
//! operation. The rating prompt follows it; a failed prompt leaves the
//! engagement at `PaymentConfirmed`, from where the listing can be resolved.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::handlers::support::{notify, publish_event};
use crate::domain::engagement::{Engagement, EngagementError, EngagementEvent, EngagementStatus};
use crate::domain::foundation::{MessageId, Money, Timestamp, UserId};
use crate::domain::notification::rating_trigger::{rating_notification, should_enqueue};
use crate::domain::notification::{types, Notification, RatingPrompt};
use crate::domain::payment::{extract_amount, ProviderStats, Transaction};
use crate::ports::{
    ConfirmPayment, ConversationRepository, EngagementRepository, EventPublisher,
    NotificationRepository, PaymentLedger,
};

/// Unread prompts scanned when deciding whether to enqueue another.
const PROMPT_SCAN_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    /// The confirming provider.
    pub actor_id: UserId,
    /// The proof message being confirmed.
    pub message_id: MessageId,
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentResult {
    pub transaction: Transaction,
    pub stats: ProviderStats,
    /// `None` when the proof is not tied to a tracked engagement.
    pub engagement: Option<Engagement>,
    pub listing_completions: Option<u64>,
    /// The rating prompt sent to the client, if one was created.
    pub rating_prompt: Option<Notification>,
}

pub struct ConfirmPaymentHandler {
    conversations: Arc<dyn ConversationRepository>,
    engagements: Arc<dyn EngagementRepository>,
    ledger: Arc<dyn PaymentLedger>,
    notifications: Arc<dyn NotificationRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ConfirmPaymentHandler {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        engagements: Arc<dyn EngagementRepository>,
        ledger: Arc<dyn PaymentLedger>,
        notifications: Arc<dyn NotificationRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            conversations,
            engagements,
            ledger,
            notifications,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmPaymentCommand,
    ) -> Result<ConfirmPaymentResult, EngagementError> {
        // 1. Load the proof message and authorize
        let message = self
            .conversations
            .find_message(&cmd.message_id)
            .await?
            .ok_or_else(|| {
                EngagementError::not_found("Message", format!("Message {}", cmd.message_id))
            })?;
        if !message.is_payment_proof() {
            return Err(EngagementError::validation(
                "message_id",
                format!("Message {} carries no payment proof", message.id),
            ));
        }
        if message.receiver_id != cmd.actor_id {
            return Err(EngagementError::authorization(
                "Only the paid provider may confirm this payment",
            ));
        }
        if message.payment_confirmed {
            return Err(EngagementError::AlreadyProcessed(format!(
                "Payment for message {} is already confirmed",
                message.id
            )));
        }

        // 2. The engagement must be waiting for exactly this proof. The ledger
        //    repeats these checks atomically; failing here skips the write.
        let stored = self.engagements.find_by_payment_message(&message.id).await?;
        if let Some(engagement) = &stored {
            engagement.check_provider(&cmd.actor_id)?;
            if engagement.payment_message_id.as_ref() != Some(&message.id) {
                return Err(EngagementError::InvalidState(format!(
                    "Proof {} was superseded by a later submission for engagement {}",
                    message.id, engagement.id
                )));
            }
            match engagement.status {
                EngagementStatus::PaymentSubmitted => {}
                status if status.is_paid() => {
                    return Err(EngagementError::AlreadyProcessed(format!(
                        "Engagement {} is already {}",
                        engagement.id, status
                    )))
                }
                status => {
                    return Err(EngagementError::InvalidState(format!(
                        "Engagement {} is {} and cannot be confirmed",
                        engagement.id, status
                    )))
                }
            }
        } else {
            debug!(message_id = %message.id, "proof has no tracked engagement");
        }

        // 3. Revenue-affecting unit, engagement transition included
        let amount = message
            .payment_amount
            .or_else(|| extract_amount(&message.text))
            .unwrap_or(Money::ZERO);
        let confirmation = self
            .ledger
            .confirm_payment(ConfirmPayment {
                message_id: message.id.clone(),
                provider_id: cmd.actor_id.clone(),
                client_id: message.sender_id.clone(),
                listing_id: message.service_id.clone(),
                amount,
            })
            .await?;
        let transaction = confirmation.transaction;
        let mut engagement = confirmation.engagement;

        info!(
            message_id = %message.id,
            transaction_id = %transaction.id,
            provider_id = %cmd.actor_id,
            amount = %transaction.amount,
            total_revenue = %confirmation.stats.total_revenue,
            engagement_id = ?engagement.as_ref().map(|e| e.id.to_string()),
            "payment confirmed"
        );

        // 4. Rating trigger
        let rating_prompt = self.enqueue_rating_prompt(&message.sender_id, &transaction).await;
        if let (Some(_), Some(e)) = (&rating_prompt, engagement.as_mut()) {
            let before = e.clone();
            match e.request_rating() {
                Ok(()) => {
                    if let Err(err) = self.engagements.update(e, &before).await {
                        warn!(engagement_id = %e.id, error = %err, "failed to record rating request");
                        *e = before;
                    }
                }
                Err(err) => {
                    warn!(engagement_id = %e.id, error = %err, "rating request transition refused");
                }
            }
        }

        if let Some(e) = &engagement {
            publish_event(
                self.event_publisher.as_ref(),
                &EngagementEvent::PaymentConfirmed {
                    engagement_id: e.id.clone(),
                    transaction_id: transaction.id.clone(),
                    provider_id: cmd.actor_id.clone(),
                    amount: transaction.amount,
                    occurred_at: Timestamp::now(),
                },
            )
            .await;
        }

        Ok(ConfirmPaymentResult {
            transaction,
            stats: confirmation.stats,
            engagement,
            listing_completions: confirmation.listing_completions,
            rating_prompt,
        })
    }

    /// Creates the client's rating prompt unless one for the same transaction
    /// is still unread. Failures are logged.
    async fn enqueue_rating_prompt(
        &self,
        client_id: &UserId,
        transaction: &Transaction,
    ) -> Option<Notification> {
        let Some(service_id) = transaction.service_id.clone() else {
            debug!(transaction_id = %transaction.id, "no service to rate");
            return None;
        };

        let unread = match self
            .notifications
            .unread_of_type(client_id, types::PAYMENT_CONFIRMED_RATING, PROMPT_SCAN_LIMIT)
            .await
        {
            Ok(unread) => unread,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "failed to read pending rating prompts");
                return None;
            }
        };
        if !should_enqueue(&unread, &transaction.id) {
            debug!(transaction_id = %transaction.id, "rating prompt already pending");
            return None;
        }

        let prompt = RatingPrompt {
            service_id,
            provider_id: transaction.provider_id.clone(),
            transaction_id: transaction.id.clone(),
        };
        notify(
            self.notifications.as_ref(),
            self.event_publisher.as_ref(),
            rating_notification(client_id.clone(), &prompt),
        )
        .await
    }
}
