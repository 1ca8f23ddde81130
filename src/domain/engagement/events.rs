//! Engagement domain events.
//!
//! Published after each committed transition. Past-tense names; routing keys
//! live under the `engagement.` prefix.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainEvent, EngagementId, ListingId, MessageId, Money, Timestamp, TransactionId, UserId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementEvent {
    /// Client picked a listing.
    Selected {
        engagement_id: EngagementId,
        listing_id: ListingId,
        client_id: UserId,
        provider_id: UserId,
        occurred_at: Timestamp,
    },

    /// Provider accepted and the listing is now reserved.
    ///
    /// State transition: Selected → Accepted → Reserved
    Accepted {
        engagement_id: EngagementId,
        listing_id: ListingId,
        client_id: UserId,
        occurred_at: Timestamp,
    },

    /// State transition: Selected → Declined
    Declined {
        engagement_id: EngagementId,
        listing_id: ListingId,
        client_id: UserId,
        occurred_at: Timestamp,
    },

    /// Client uploaded a proof of payment.
    PaymentSubmitted {
        engagement_id: EngagementId,
        message_id: MessageId,
        amount: Option<Money>,
        occurred_at: Timestamp,
    },

    /// Provider confirmed payment; revenue counted once.
    PaymentConfirmed {
        engagement_id: EngagementId,
        transaction_id: TransactionId,
        provider_id: UserId,
        amount: Money,
        occurred_at: Timestamp,
    },

    /// Listing returned to the market.
    ListingReleased {
        engagement_id: EngagementId,
        listing_id: ListingId,
        occurred_at: Timestamp,
    },

    /// Listing retired.
    ListingReplaced {
        engagement_id: EngagementId,
        listing_id: ListingId,
        occurred_at: Timestamp,
    },
}

impl EngagementEvent {
    pub fn engagement_id(&self) -> &EngagementId {
        match self {
            EngagementEvent::Selected { engagement_id, .. }
            | EngagementEvent::Accepted { engagement_id, .. }
            | EngagementEvent::Declined { engagement_id, .. }
            | EngagementEvent::PaymentSubmitted { engagement_id, .. }
            | EngagementEvent::PaymentConfirmed { engagement_id, .. }
            | EngagementEvent::ListingReleased { engagement_id, .. }
            | EngagementEvent::ListingReplaced { engagement_id, .. } => engagement_id,
        }
    }
}

impl DomainEvent for EngagementEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EngagementEvent::Selected { .. } => "engagement.selected",
            EngagementEvent::Accepted { .. } => "engagement.accepted",
            EngagementEvent::Declined { .. } => "engagement.declined",
            EngagementEvent::PaymentSubmitted { .. } => "engagement.payment_submitted",
            EngagementEvent::PaymentConfirmed { .. } => "engagement.payment_confirmed",
            EngagementEvent::ListingReleased { .. } => "engagement.listing_released",
            EngagementEvent::ListingReplaced { .. } => "engagement.listing_replaced",
        }
    }

    fn aggregate_id(&self) -> String {
        self.engagement_id().to_string()
    }

    fn aggregate_type(&self) -> &'static str {
        "Engagement"
    }

    fn occurred_at(&self) -> Timestamp {
        match self {
            EngagementEvent::Selected { occurred_at, .. }
            | EngagementEvent::Accepted { occurred_at, .. }
            | EngagementEvent::Declined { occurred_at, .. }
            | EngagementEvent::PaymentSubmitted { occurred_at, .. }
            | EngagementEvent::PaymentConfirmed { occurred_at, .. }
            | EngagementEvent::ListingReleased { occurred_at, .. }
            | EngagementEvent::ListingReplaced { occurred_at, .. } => *occurred_at,
        }
    }
}
