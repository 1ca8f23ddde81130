//! Payment transaction record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{
    DomainError, ErrorCode, ListingId, MessageId, Money, RawDate, StateMachine, Timestamp,
    TransactionId, UserId,
};

/// Transaction lifecycle. Never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Proof submitted, provider has not confirmed.
    Pending,
    /// Provider confirmed receipt; counted as revenue.
    Confirmed,
    /// Closed out by an external process.
    Completed,
}

impl TransactionStatus {
    /// True for statuses that count as accepted revenue.
    pub fn is_accepted(&self) -> bool {
        matches!(self, TransactionStatus::Confirmed | TransactionStatus::Completed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Confirmed => "confirmed",
            TransactionStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!((self, target), (Pending, Confirmed) | (Confirmed, Completed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Confirmed],
            Confirmed => vec![Completed],
            Completed => vec![],
        }
    }
}

/// A payment between a client and a provider for one service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub provider_id: UserId,
    pub client_id: UserId,
    #[serde(default)]
    pub service_id: Option<ListingId>,
    pub amount: Money,
    pub status: TransactionStatus,
    /// URL of the proof artifact this payment was claimed with.
    #[serde(default)]
    pub payment_proof_ref: Option<String>,
    /// Proof message the transaction was created from.
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub created_at: RawDate,
    #[serde(default)]
    pub confirmed_at: Option<Timestamp>,
}

impl Transaction {
    /// Records a claimed, unconfirmed payment.
    pub fn pending(
        provider_id: UserId,
        client_id: UserId,
        service_id: Option<ListingId>,
        amount: Money,
        payment_proof_ref: Option<String>,
        message_id: Option<MessageId>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            provider_id,
            client_id,
            service_id,
            amount,
            status: TransactionStatus::Pending,
            payment_proof_ref,
            message_id,
            created_at: RawDate::Native(Timestamp::now()),
            confirmed_at: None,
        }
    }

    /// True when this transaction was created for the given proof by the
    /// given provider.
    pub fn matches_proof(&self, proof_ref: &str, provider_id: &UserId) -> bool {
        self.payment_proof_ref.as_deref() == Some(proof_ref) && &self.provider_id == provider_id
    }

    /// `Pending -> Confirmed`. Confirming twice is `AlreadyProcessed`.
    pub fn confirm(&mut self) -> Result<(), DomainError> {
        if self.status.is_accepted() {
            return Err(DomainError::new(
                ErrorCode::AlreadyProcessed,
                format!("Transaction {} is already {}", self.id, self.status),
            )
            .with_detail("transaction_id", self.id.to_string()));
        }
        self.status = self.status.transition_to(TransactionStatus::Confirmed)?;
        self.confirmed_at = Some(Timestamp::now());
        Ok(())
    }

    /// `Confirmed -> Completed`.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.status = self.status.transition_to(TransactionStatus::Completed)?;
        Ok(())
    }
}
