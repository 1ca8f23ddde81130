//! Engagement aggregate.
//!
//! The persisted record of one engagement between a client and a listing.
//! Transitions are explicit and repeat-safe: a command whose effect is already
//! visible in the record fails with `AlreadyProcessed` and leaves the record
//! untouched.
//!
//! # Invariants
//!
//! - `client_id != provider_id`
//! - `payment_message_id` is set from `PaymentSubmitted` onward
//! - a proof replaced by a later submission is kept in
//!   `superseded_payment_messages` and can never be confirmed
//! - `transaction_id` is set from `PaymentConfirmed` onward
//! - `revision` grows by one with every change; stores use it for
//!   compare-and-set

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, EngagementId, ErrorCode, ListingId, MessageId, OwnedByUser, StateMachine,
    ThreadId, Timestamp, TransactionId, UserId,
};
use crate::domain::listing::ServiceListing;

use super::EngagementStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub id: EngagementId,
    pub listing_id: ListingId,
    pub client_id: UserId,
    pub provider_id: UserId,
    pub thread_id: ThreadId,
    pub status: EngagementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superseded_payment_messages: Vec<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default)]
    pub revision: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Engagement {
    /// Starts an engagement: the client selects `listing`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the client owns the listing
    /// - `ListingUnavailable` if the listing is retired or held by someone else
    pub fn select(listing: &ServiceListing, client_id: UserId) -> Result<Self, DomainError> {
        listing.check_not_owner(&client_id)?;

        if !listing.active || !listing.is_available_for(&client_id) {
            return Err(DomainError::new(
                ErrorCode::ListingUnavailable,
                format!("Listing {} is unavailable", listing.id),
            )
            .with_detail("listing_id", listing.id.to_string()));
        }

        let status = EngagementStatus::Browsing.transition_to(EngagementStatus::Selected)?;
        let now = Timestamp::now();
        Ok(Self {
            id: EngagementId::generate(),
            listing_id: listing.id.clone(),
            thread_id: ThreadId::for_service(&client_id, &listing.provider_id, Some(&listing.id)),
            client_id,
            provider_id: listing.provider_id.clone(),
            status,
            payment_message_id: None,
            superseded_payment_messages: Vec::new(),
            transaction_id: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fails with `Forbidden` unless `actor` is the listing's provider.
    pub fn check_provider(&self, actor: &UserId) -> Result<(), DomainError> {
        if &self.provider_id == actor {
            Ok(())
        } else {
            Err(forbidden("Only the provider may perform this action", actor))
        }
    }

    /// Fails with `Forbidden` unless `actor` is the selecting client.
    pub fn check_client(&self, actor: &UserId) -> Result<(), DomainError> {
        if &self.client_id == actor {
            Ok(())
        } else {
            Err(forbidden("Only the client may perform this action", actor))
        }
    }

    /// `Selected -> Accepted`. The caller takes the listing reservation next
    /// and then calls [`Engagement::mark_reserved`].
    pub fn accept(&mut self) -> Result<(), DomainError> {
        use EngagementStatus::*;
        self.advance(
            Accepted,
            &[
                Accepted,
                Reserved,
                PaymentSubmitted,
                PaymentConfirmed,
                RatingRequested,
                MadeAvailable,
                Replaced,
            ],
        )
    }

    /// Undoes [`Engagement::accept`] when the reservation could not be taken.
    ///
    /// Only legal from `Accepted`; the state machine has no such edge because
    /// no command other than a failed reservation may take it.
    pub fn revert_accept(&mut self) -> Result<(), DomainError> {
        if self.status != EngagementStatus::Accepted {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Engagement {} is {}, not accepted", self.id, self.status),
            )
            .with_detail("engagement_id", self.id.to_string()));
        }
        self.status = EngagementStatus::Selected;
        self.touch();
        Ok(())
    }

    /// `Accepted -> Reserved`, once the listing compare-and-set succeeded.
    pub fn mark_reserved(&mut self) -> Result<(), DomainError> {
        self.advance(EngagementStatus::Reserved, &[EngagementStatus::Reserved])
    }

    /// `Selected -> Declined`.
    pub fn decline(&mut self) -> Result<(), DomainError> {
        self.advance(EngagementStatus::Declined, &[EngagementStatus::Declined])
    }

    /// `Reserved | PaymentSubmitted -> PaymentSubmitted`. A resubmission
    /// supersedes the previous proof message.
    pub fn submit_payment(&mut self, message_id: MessageId) -> Result<(), DomainError> {
        self.advance(EngagementStatus::PaymentSubmitted, &[])?;
        if let Some(previous) = self.payment_message_id.replace(message_id) {
            self.superseded_payment_messages.push(previous);
        }
        Ok(())
    }

    /// True if `message_id` is the current or a superseded proof of this
    /// engagement.
    pub fn holds_payment_message(&self, message_id: &MessageId) -> bool {
        self.payment_message_id.as_ref() == Some(message_id)
            || self.superseded_payment_messages.contains(message_id)
    }

    /// `PaymentSubmitted -> PaymentConfirmed` for the current proof message.
    ///
    /// # Errors
    ///
    /// - `AlreadyProcessed` if the payment was already confirmed
    /// - `InvalidStateTransition` if `message_id` was superseded by a later
    ///   proof or the engagement is not awaiting confirmation
    pub fn confirm_payment(
        &mut self,
        message_id: &MessageId,
        transaction_id: TransactionId,
    ) -> Result<(), DomainError> {
        use EngagementStatus::*;
        if self.superseded_payment_messages.contains(message_id) {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Proof {} of engagement {} was superseded by a later submission",
                    message_id, self.id
                ),
            )
            .with_detail("engagement_id", self.id.to_string())
            .with_detail("message_id", message_id.to_string()));
        }
        self.advance(
            PaymentConfirmed,
            &[PaymentConfirmed, RatingRequested, MadeAvailable, Replaced],
        )?;
        self.transaction_id = Some(transaction_id);
        Ok(())
    }

    /// `PaymentConfirmed -> RatingRequested`.
    pub fn request_rating(&mut self) -> Result<(), DomainError> {
        use EngagementStatus::*;
        self.advance(RatingRequested, &[RatingRequested, MadeAvailable, Replaced])
    }

    /// Releases the listing back to the market.
    pub fn make_available(&mut self) -> Result<(), DomainError> {
        use EngagementStatus::*;
        self.advance(MadeAvailable, &[MadeAvailable, Replaced])
    }

    /// Retires the listing.
    pub fn replace(&mut self) -> Result<(), DomainError> {
        use EngagementStatus::*;
        self.advance(Replaced, &[MadeAvailable, Replaced])
    }

    /// Applies a transition, reporting `AlreadyProcessed` if the engagement
    /// is already in one of `done`.
    fn advance(
        &mut self,
        target: EngagementStatus,
        done: &[EngagementStatus],
    ) -> Result<(), DomainError> {
        if done.contains(&self.status) {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!("Engagement {} is already {}", self.id, self.status),
            )
            .with_detail("engagement_id", self.id.to_string())
            .with_detail("status", self.status.to_string()));
        }
        self.status = self.status.transition_to(target)?;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Timestamp::now();
    }
}

fn forbidden(message: &str, actor: &UserId) -> DomainError {
    DomainError::new(ErrorCode::Forbidden, message).with_detail("requested_by", actor.to_string())
}
