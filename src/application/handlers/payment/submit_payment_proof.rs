//! SubmitPaymentProofHandler - Command handler for a client's proof upload.
//!
//! Everything that can be rejected is rejected before the upload: the file's
//! shape, the claimed amount, and which engagement the proof belongs to. The
//! proof message is the one fatal write after the upload; the notification
//! and event that follow are best effort.

use std::sync::Arc;
use tracing::{debug, info};

use crate::application::handlers::support::{append_and_announce, notify, publish_event};
use crate::domain::conversation::Message;
use crate::domain::engagement::{Engagement, EngagementError, EngagementEvent};
use crate::domain::foundation::{ListingId, Money, Timestamp, UserId};
use crate::domain::notification::{payload, types, Notification};
use crate::domain::payment::{parse_claimed_amount, ProofPolicy, ProofUpload, Transaction};
use crate::ports::{
    ArtifactUploader, ConversationRepository, EngagementRepository, EventPublisher,
    ListingRepository, NotificationRepository, PaymentLedger,
};

pub const DEFAULT_PROOF_FOLDER: &str = "payment_proofs";

/// Command to attach a payment proof.
#[derive(Debug, Clone)]
pub struct SubmitPaymentProofCommand {
    /// The paying client.
    pub actor_id: UserId,
    /// The provider being paid.
    pub provider_id: UserId,
    /// Listing the payment is for. Inferred when the client has exactly one
    /// engagement with the provider awaiting payment.
    pub service_id: Option<ListingId>,
    pub proof: ProofUpload,
    /// Free-text claimed amount, e.g. `"₱1,000"` or `"1000"`.
    pub claimed_amount: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SubmitPaymentProofResult {
    pub engagement: Engagement,
    pub message: Message,
    pub transaction: Transaction,
    pub notification: Option<Notification>,
}

pub struct SubmitPaymentProofHandler {
    engagements: Arc<dyn EngagementRepository>,
    listings: Arc<dyn ListingRepository>,
    conversations: Arc<dyn ConversationRepository>,
    ledger: Arc<dyn PaymentLedger>,
    notifications: Arc<dyn NotificationRepository>,
    uploader: Arc<dyn ArtifactUploader>,
    event_publisher: Arc<dyn EventPublisher>,
    policy: ProofPolicy,
    folder: String,
}

impl SubmitPaymentProofHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engagements: Arc<dyn EngagementRepository>,
        listings: Arc<dyn ListingRepository>,
        conversations: Arc<dyn ConversationRepository>,
        ledger: Arc<dyn PaymentLedger>,
        notifications: Arc<dyn NotificationRepository>,
        uploader: Arc<dyn ArtifactUploader>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            engagements,
            listings,
            conversations,
            ledger,
            notifications,
            uploader,
            event_publisher,
            policy: ProofPolicy::default(),
            folder: DEFAULT_PROOF_FOLDER.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: ProofPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload folder for proof artifacts.
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }

    pub async fn handle(
        &self,
        cmd: SubmitPaymentProofCommand,
    ) -> Result<SubmitPaymentProofResult, EngagementError> {
        // 1. Shape checks
        self.policy.validate(&cmd.proof)?;
        let claimed = match cmd.claimed_amount.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(parse_claimed_amount(text)?),
            _ => None,
        };

        // 2. Which engagement is being paid
        let stored = self.resolve_engagement(&cmd).await?;
        stored.check_client(&cmd.actor_id)?;
        if !stored.status.accepts_payment_proof() {
            return Err(EngagementError::InvalidState(format!(
                "Engagement {} is {} and does not accept a payment proof",
                stored.id, stored.status
            )));
        }

        // 3. Amount: the claim, else the listing price
        let listing = self.listings.find_by_id(&stored.listing_id).await?;
        let amount = claimed.or_else(|| listing.as_ref().map(|l| l.price));
        let title = listing.map(|l| l.title);

        // 4. Upload
        let artifact = self.uploader.upload(&cmd.proof, &self.folder).await?;
        debug!(engagement_id = %stored.id, url = %artifact.url, "payment proof uploaded");

        // 5. Proof message, then the pending transaction, then the transition
        let appended = append_and_announce(
            self.conversations.as_ref(),
            self.event_publisher.as_ref(),
            Message::payment_proof(
                stored.thread_id.clone(),
                stored.client_id.clone(),
                stored.provider_id.clone(),
                artifact.url.clone(),
                amount,
                stored.listing_id.clone(),
            ),
            title,
        )
        .await?;
        let message = appended.message;

        let transaction = Transaction::pending(
            stored.provider_id.clone(),
            stored.client_id.clone(),
            Some(stored.listing_id.clone()),
            amount.unwrap_or(Money::ZERO),
            Some(artifact.url),
            Some(message.id.clone()),
        );
        self.ledger.record_pending(&transaction).await?;

        let mut engagement = stored.clone();
        engagement.submit_payment(message.id.clone())?;
        self.engagements.update(&engagement, &stored).await?;

        info!(
            engagement_id = %engagement.id,
            message_id = %message.id,
            amount = ?amount.map(|a| a.to_string()),
            "payment proof submitted"
        );

        // 6. Tell the provider
        let text = match amount {
            Some(amount) => format!("Payment proof received: ₱{}", amount),
            None => "Payment proof received".to_string(),
        };
        let notification = notify(
            self.notifications.as_ref(),
            self.event_publisher.as_ref(),
            Notification::new(
                engagement.provider_id.clone(),
                types::PAYMENT_SUBMITTED,
                "Payment proof submitted",
                text,
                payload([
                    ("serviceId", Some(engagement.listing_id.to_string())),
                    ("clientId", Some(engagement.client_id.to_string())),
                    ("messageId", Some(message.id.to_string())),
                    ("amount", amount.map(|a| a.to_string())),
                ]),
            ),
        )
        .await;

        publish_event(
            self.event_publisher.as_ref(),
            &EngagementEvent::PaymentSubmitted {
                engagement_id: engagement.id.clone(),
                message_id: message.id.clone(),
                amount,
                occurred_at: Timestamp::now(),
            },
        )
        .await;

        Ok(SubmitPaymentProofResult {
            engagement,
            message,
            transaction,
            notification,
        })
    }

    async fn resolve_engagement(
        &self,
        cmd: &SubmitPaymentProofCommand,
    ) -> Result<Engagement, EngagementError> {
        if let Some(service_id) = &cmd.service_id {
            return match self.engagements.find_open(&cmd.actor_id, service_id).await? {
                Some(e) if e.provider_id == cmd.provider_id => Ok(e),
                _ => Err(EngagementError::validation(
                    "service_id",
                    format!("missing selection for listing {}", service_id),
                )),
            };
        }

        let mut awaiting: Vec<Engagement> = self
            .engagements
            .open_between(&cmd.actor_id, &cmd.provider_id)
            .await?
            .into_iter()
            .filter(|e| e.status.accepts_payment_proof())
            .collect();
        match awaiting.len() {
            0 => Err(EngagementError::validation(
                "service_id",
                "missing selection: no accepted service awaits payment",
            )),
            1 => Ok(awaiting.remove(0)),
            n => Err(EngagementError::validation(
                "service_id",
                format!("{} services await payment; specify the service id", n),
            )),
        }
    }
}
