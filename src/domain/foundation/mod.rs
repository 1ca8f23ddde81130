//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the state machine
//! and ownership traits that form the vocabulary of the engagement domain.

mod errors;
mod events;
mod ids;
mod money;
mod ownership;
mod rating;
mod raw_date;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, SerializableDomainEvent};
pub use ids::{
    ConversationId, EngagementId, ListingId, MessageId, NotificationId, ReviewId, ThreadId,
    TransactionId, UserId,
};
pub use money::Money;
pub use ownership::OwnedByUser;
pub use rating::Rating;
pub use raw_date::{NormalizedDate, RawDate};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
