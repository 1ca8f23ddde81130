//! Payment ledger port.
//!
//! Holds transactions and provider revenue counters. Confirmation is one
//! atomic store operation, engagement transition included, so a failure
//! leaves no partial writes and a repeat never counts twice.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ListingId, MessageId, Money, UserId};
use crate::domain::engagement::Engagement;
use crate::domain::payment::{ProviderStats, Transaction};

/// Input for [`PaymentLedger::confirm_payment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPayment {
    pub message_id: MessageId,
    pub provider_id: UserId,
    pub client_id: UserId,
    pub listing_id: Option<ListingId>,
    /// Used only when no pending transaction matches the proof.
    pub amount: Money,
}

/// State after a successful confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub transaction: Transaction,
    pub stats: ProviderStats,
    /// Listing completion count after the increment, if a listing was given.
    pub listing_completions: Option<u64>,
    /// The engagement the proof belongs to, now `PaymentConfirmed`. `None`
    /// for proofs no engagement tracks.
    pub engagement: Option<Engagement>,
}

#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Stores a pending transaction.
    async fn record_pending(&self, transaction: &Transaction) -> Result<(), DomainError>;

    /// The transaction created for a proof URL by a provider's client.
    async fn find_by_proof(
        &self,
        proof_ref: &str,
        provider_id: &UserId,
    ) -> Result<Option<Transaction>, DomainError>;

    /// Atomically:
    /// 1. flags the proof message `payment_confirmed`
    /// 2. finds the pending transaction by proof URL and provider, or creates one
    /// 3. moves it to `confirmed`
    /// 4. adds its amount to the provider's revenue and one to their count
    /// 5. adds one to the listing's `total_completions`
    /// 6. moves the engagement holding this proof to `PaymentConfirmed`
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message does not exist
    /// - `ValidationFailed` if the message carries no payment proof
    /// - `AlreadyProcessed` if the message or its engagement was already
    ///   confirmed; nothing changes
    /// - `InvalidStateTransition` if a later proof superseded this one
    /// - `InternalError` if a counter would leave its range
    async fn confirm_payment(
        &self,
        request: ConfirmPayment,
    ) -> Result<PaymentConfirmation, DomainError>;

    /// Transactions where the user is provider or client.
    async fn transactions_for_user(&self, user_id: &UserId)
        -> Result<Vec<Transaction>, DomainError>;

    async fn provider_stats(&self, provider_id: &UserId) -> Result<ProviderStats, DomainError>;
}
