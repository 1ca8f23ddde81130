//! Chat message document.
//!
//! Messages are append-only except for the `payment_confirmed` flag, which the
//! owning provider flips exactly once.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ListingId, MessageId, Money, RawDate, ThreadId, Timestamp, UserId};

/// What a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Free text typed by a participant.
    Plain,
    /// Workflow notice generated by a transition.
    System,
    /// A client's proof-of-payment upload.
    PaymentProof,
}

/// A message within a per-service thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    /// The per-service thread this message belongs to.
    pub conversation_id: ThreadId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub text: String,
    /// Send time; the store never lets it precede the thread's last message.
    #[serde(default)]
    pub timestamp: RawDate,
    pub kind: MessageKind,
    /// Durable URL of the uploaded proof artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<Money>,
    #[serde(default)]
    pub payment_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ListingId>,
}

impl Message {
    fn base(
        conversation_id: ThreadId,
        sender_id: UserId,
        receiver_id: UserId,
        text: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender_id,
            receiver_id,
            text: text.into(),
            timestamp: RawDate::Native(Timestamp::now()),
            kind,
            payment_proof: None,
            payment_amount: None,
            payment_confirmed: false,
            service_id: None,
        }
    }

    /// A participant's free-text message.
    pub fn plain(
        conversation_id: ThreadId,
        sender_id: UserId,
        receiver_id: UserId,
        text: impl Into<String>,
    ) -> Self {
        Self::base(conversation_id, sender_id, receiver_id, text, MessageKind::Plain)
    }

    /// A workflow notice attributed to the acting participant.
    pub fn system(
        conversation_id: ThreadId,
        sender_id: UserId,
        receiver_id: UserId,
        text: impl Into<String>,
        service_id: Option<ListingId>,
    ) -> Self {
        let mut message =
            Self::base(conversation_id, sender_id, receiver_id, text, MessageKind::System);
        message.service_id = service_id;
        message
    }

    /// A proof-of-payment message from client to provider.
    pub fn payment_proof(
        conversation_id: ThreadId,
        client_id: UserId,
        provider_id: UserId,
        proof_url: impl Into<String>,
        amount: Option<Money>,
        service_id: ListingId,
    ) -> Self {
        let text = match amount {
            Some(amount) => format!("Payment proof submitted: ₱{}", amount),
            None => "Payment proof submitted".to_string(),
        };
        let mut message =
            Self::base(conversation_id, client_id, provider_id, text, MessageKind::PaymentProof);
        message.payment_proof = Some(proof_url.into());
        message.payment_amount = amount;
        message.service_id = Some(service_id);
        message
    }

    /// True when the message carries a payment proof reference.
    pub fn is_payment_proof(&self) -> bool {
        self.kind == MessageKind::PaymentProof && self.payment_proof.is_some()
    }

    /// True when the user sent or received this message.
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.sender_id == user_id || &self.receiver_id == user_id
    }
}
