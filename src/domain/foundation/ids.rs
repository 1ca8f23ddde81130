//! Strongly-typed identifier value objects.
//!
//! Every record in the document store is keyed by an opaque string, so the
//! identifiers here wrap `String` rather than `Uuid`. Freshly minted ids use
//! UUID v4 text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from an existing string, rejecting empty values.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Mints a new random id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

document_id!(
    /// Service listing identifier. Doubles as the "service id" on messages.
    ListingId,
    "listing_id"
);
document_id!(
    /// Identifier of one engagement instance.
    EngagementId,
    "engagement_id"
);
document_id!(
    /// Chat message identifier.
    MessageId,
    "message_id"
);
document_id!(
    /// Payment transaction record identifier.
    TransactionId,
    "transaction_id"
);
document_id!(
    /// Notification identifier.
    NotificationId,
    "notification_id"
);
document_id!(
    /// Review identifier.
    ReviewId,
    "review_id"
);

/// User identifier (supplied by the identity collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of the logical contact between two users.
///
/// Always the sorted join of both user ids, so either side derives the same
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Derives the conversation id for a pair of users.
    pub fn for_pair(a: &UserId, b: &UserId) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{}_{}", low, high))
    }

    /// Wraps an id read back from the store.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one per-service message thread.
///
/// Format: `<conversation id>_<listing id>`; threads without a service use the
/// bare conversation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Derives the thread id for a pair of users talking about one listing.
    pub fn for_service(a: &UserId, b: &UserId, listing_id: Option<&ListingId>) -> Self {
        let conversation = ConversationId::for_pair(a, b);
        match listing_id {
            Some(listing) => Self(format!("{}_{}", conversation, listing)),
            None => Self(conversation.0),
        }
    }

    /// Wraps an id read back from the store.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("thread_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[test]
    fn user_id_rejects_empty_string() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn document_ids_reject_empty_string() {
        assert!(ListingId::new("").is_err());
        assert!(MessageId::new("").is_err());
        assert!(TransactionId::new("tx-1").is_ok());
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EngagementId::generate(), EngagementId::generate());
    }

    #[test]
    fn conversation_id_is_symmetric() {
        let a = user("alice");
        let b = user("bob");
        assert_eq!(ConversationId::for_pair(&a, &b), ConversationId::for_pair(&b, &a));
        assert_eq!(ConversationId::for_pair(&b, &a).as_str(), "alice_bob");
    }

    #[test]
    fn thread_id_appends_listing() {
        let listing = ListingId::new("L1").unwrap();
        let thread = ThreadId::for_service(&user("bob"), &user("alice"), Some(&listing));
        assert_eq!(thread.as_str(), "alice_bob_L1");
    }

    #[test]
    fn thread_id_without_listing_is_conversation_id() {
        let thread = ThreadId::for_service(&user("bob"), &user("alice"), None);
        assert_eq!(thread.as_str(), "alice_bob");
    }

    #[test]
    fn ids_serialize_transparently() {
        let id = ListingId::new("L-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"L-42\"");
    }

    #[test]
    fn ids_parse_from_str() {
        let id: MessageId = "m-1".parse().unwrap();
        assert_eq!(id.as_str(), "m-1");
        assert!("".parse::<MessageId>().is_err());
    }
}
