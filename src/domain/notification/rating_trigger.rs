//! Rating trigger.
//!
//! After a payment is confirmed the client gets exactly one
//! `payment_confirmed_rating` prompt. The trigger itself holds no state: the
//! decisions below are taken against the unread prompts already stored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::domain::foundation::{ListingId, TransactionId, UserId};

use super::{payload, types, Notification};

/// What a rating prompt points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPrompt {
    pub service_id: ListingId,
    pub provider_id: UserId,
    pub transaction_id: TransactionId,
}

impl RatingPrompt {
    fn to_payload(&self) -> Map<String, JsonValue> {
        payload([
            ("serviceId", Some(self.service_id.to_string())),
            ("providerId", Some(self.provider_id.to_string())),
            ("transactionId", Some(self.transaction_id.to_string())),
        ])
    }

    /// Reads the prompt back from a stored notification.
    pub fn from_notification(notification: &Notification) -> Option<Self> {
        if !notification.is_type(types::PAYMENT_CONFIRMED_RATING) {
            return None;
        }
        Some(Self {
            service_id: ListingId::new(notification.payload_str("serviceId")?).ok()?,
            provider_id: UserId::new(notification.payload_str("providerId")?).ok()?,
            transaction_id: TransactionId::new(notification.payload_str("transactionId")?).ok()?,
        })
    }
}

/// Builds the prompt notification for `client_id`.
pub fn rating_notification(client_id: UserId, prompt: &RatingPrompt) -> Notification {
    Notification::new(
        client_id,
        types::PAYMENT_CONFIRMED_RATING,
        "Rate your service",
        "Your payment was confirmed. How was the service?",
        prompt.to_payload(),
    )
}

/// True when no unread prompt for the same transaction is already live.
pub fn should_enqueue(unread_prompts: &[Notification], transaction_id: &TransactionId) -> bool {
    !unread_prompts.iter().any(|n| {
        !n.read
            && n.is_type(types::PAYMENT_CONFIRMED_RATING)
            && n.payload_str("transactionId") == Some(transaction_id.as_str())
    })
}

/// The prompt to show: the most recently created unread one.
pub fn most_relevant(unread_prompts: &[Notification]) -> Option<&Notification> {
    unread_prompts
        .iter()
        .filter(|n| !n.read && n.is_type(types::PAYMENT_CONFIRMED_RATING))
        .max_by_key(|n| n.created_instant())
}
