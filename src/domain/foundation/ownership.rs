//! Ownership trait for provider-owned resources.
//!
//! Authorization in this crate is a structural id comparison: the identity
//! collaborator has already authenticated `actor`, and these checks only ask
//! whether that id is (or is not) the owner.
//!
//! # Example
//!
//! ```ignore
//! listing.check_ownership(&cmd.actor_id)?;      // provider-only actions
//! listing.check_not_owner(&cmd.client_id)?;     // no self-engagement
//! ```

use super::{DomainError, ErrorCode, UserId};

/// Trait for aggregates that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    /// Checks if the given user is the owner.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Validates ownership, returning `Forbidden` if the user is not the owner.
    fn check_ownership(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the owner may perform this action",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", user_id.to_string()))
        }
    }

    /// Validates that the user is *not* the owner, returning `Forbidden` otherwise.
    fn check_not_owner(&self, user_id: &UserId) -> Result<(), DomainError> {
        if self.is_owner(user_id) {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "Owners cannot engage their own resource",
            )
            .with_detail("owner_id", self.owner_id().to_string()))
        } else {
            Ok(())
        }
    }
}
