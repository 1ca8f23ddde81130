//! Revenue candidates.
//!
//! A candidate is one revenue-bearing record from any source stream,
//! normalized to the same shape before deduplication. Each source has its own
//! normalization function; all of them share one date routine.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::domain::conversation::Message;
use crate::domain::foundation::{ListingId, Money, RawDate, ThreadId, Timestamp, UserId};
use crate::domain::notification::Notification;
use crate::domain::payment::{extract_amount, parse_claimed_amount, Transaction};

/// Source stream of a candidate, in winner order for duplicate ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Transaction,
    NotificationPayment,
    MessagePayment,
}

/// Which side of the payment the active user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// User received the money.
    Payee,
    /// User paid.
    Payer,
}

/// Normalized revenue record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub kind: CandidateKind,
    /// Zero when no amount could be found; such candidates are counted but
    /// add nothing to sums.
    pub amount: Money,
    pub date: Timestamp,
    /// True when the source date was unusable and `date` is the fallback.
    pub date_estimated: bool,
    pub service_id: Option<ListingId>,
    pub conversation_id: Option<ThreadId>,
    pub payee: Option<UserId>,
    pub payer: Option<UserId>,
    /// Addressee, for notification candidates.
    pub recipient: Option<UserId>,
}

impl Candidate {
    /// Normalizes an accepted transaction. Pending ones are not revenue.
    pub fn from_transaction(tx: &Transaction, now: Timestamp) -> Option<Self> {
        if !tx.status.is_accepted() {
            return None;
        }
        let date = tx.created_at.normalize(now);
        Some(Self {
            id: tx.id.to_string(),
            kind: CandidateKind::Transaction,
            amount: tx.amount,
            date: date.at,
            date_estimated: date.estimated,
            service_id: tx.service_id.clone(),
            conversation_id: None,
            payee: Some(tx.provider_id.clone()),
            payer: Some(tx.client_id.clone()),
            recipient: None,
        })
    }

    /// Normalizes a payment-type notification.
    pub fn from_notification(notification: &Notification, now: Timestamp) -> Option<Self> {
        if !notification.is_payment() {
            return None;
        }
        let raw_date = match &notification.created_at {
            RawDate::Missing => payload_date(notification),
            other => other.clone(),
        };
        let date = raw_date.normalize(now);
        Some(Self {
            id: notification.id.to_string(),
            kind: CandidateKind::NotificationPayment,
            amount: notification
                .payload
                .get("amount")
                .and_then(amount_from_json)
                .unwrap_or(Money::ZERO),
            date: date.at,
            date_estimated: date.estimated,
            service_id: notification
                .payload_str("serviceId")
                .and_then(|s| ListingId::new(s).ok()),
            conversation_id: notification
                .payload_str("conversationId")
                .and_then(|s| ThreadId::new(s).ok()),
            payee: notification
                .payload_str("providerId")
                .and_then(|s| UserId::new(s).ok()),
            payer: notification
                .payload_str("clientId")
                .and_then(|s| UserId::new(s).ok()),
            recipient: Some(notification.user_id.clone()),
        })
    }

    /// Normalizes a message that carries a payment proof.
    pub fn from_message(message: &Message, now: Timestamp) -> Option<Self> {
        message.payment_proof.as_ref()?;
        let date = message.timestamp.normalize(now);
        Some(Self {
            id: message.id.to_string(),
            kind: CandidateKind::MessagePayment,
            amount: message
                .payment_amount
                .or_else(|| extract_amount(&message.text))
                .unwrap_or(Money::ZERO),
            date: date.at,
            date_estimated: date.estimated,
            service_id: message.service_id.clone(),
            conversation_id: Some(message.conversation_id.clone()),
            payee: Some(message.receiver_id.clone()),
            payer: Some(message.sender_id.clone()),
            recipient: None,
        })
    }

    /// The user's side of this payment, or `None` if it does not concern them.
    ///
    /// Notifications belong to their recipient only; the payload's
    /// `providerId`/`clientId` decide the side, defaulting to payee.
    pub fn party_for(&self, user_id: &UserId) -> Option<Party> {
        let is = |who: &Option<UserId>| who.as_ref() == Some(user_id);
        match self.kind {
            CandidateKind::NotificationPayment => {
                if !is(&self.recipient) {
                    None
                } else if is(&self.payer) && !is(&self.payee) {
                    Some(Party::Payer)
                } else {
                    Some(Party::Payee)
                }
            }
            CandidateKind::Transaction | CandidateKind::MessagePayment => {
                if is(&self.payee) {
                    Some(Party::Payee)
                } else if is(&self.payer) {
                    Some(Party::Payer)
                } else {
                    None
                }
            }
        }
    }
}

fn payload_date(notification: &Notification) -> RawDate {
    ["createdAt", "date", "timestamp"]
        .iter()
        .find_map(|key| notification.payload.get(*key))
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

fn amount_from_json(value: &JsonValue) -> Option<Money> {
    match value {
        JsonValue::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .and_then(|d| Money::new(d).ok()),
        JsonValue::String(s) => parse_claimed_amount(s).ok(),
        _ => None,
    }
}
