//! Service listing aggregate.
//!
//! # Invariants
//!
//! - `is_reserved` implies `reserved_by.is_some()`
//! - `total_completions` only grows

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, ListingId, Money, OwnedByUser, Timestamp, UserId,
};

/// A provider's advertised offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListing {
    pub id: ListingId,

    /// Owning provider.
    pub provider_id: UserId,

    #[serde(default)]
    pub title: String,

    /// Canonical price, used to pre-fill payment amounts.
    pub price: Money,

    #[serde(default)]
    pub is_reserved: bool,

    #[serde(default)]
    pub reserved_by: Option<UserId>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default)]
    pub total_completions: u64,

    #[serde(default)]
    pub updated_at: Timestamp,
}

fn default_active() -> bool {
    true
}

impl ServiceListing {
    /// Creates an active, unreserved listing.
    pub fn new(id: ListingId, provider_id: UserId, title: impl Into<String>, price: Money) -> Self {
        Self {
            id,
            provider_id,
            title: title.into(),
            price,
            is_reserved: false,
            reserved_by: None,
            active: true,
            total_completions: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// True when `client_id` may hold the reservation: the listing is free or
    /// already reserved by that same client.
    pub fn is_available_for(&self, client_id: &UserId) -> bool {
        match (&self.is_reserved, &self.reserved_by) {
            (false, _) => true,
            (true, Some(holder)) => holder == client_id,
            (true, None) => false,
        }
    }

    /// Compare-and-set reservation for `client_id`.
    ///
    /// Fails with `ListingUnavailable` if another client holds it.
    pub fn reserve(&mut self, client_id: &UserId) -> Result<(), DomainError> {
        if !self.is_available_for(client_id) {
            return Err(DomainError::new(
                ErrorCode::ListingUnavailable,
                format!("Listing {} is reserved by another client", self.id),
            )
            .with_detail("listing_id", self.id.to_string()));
        }
        self.is_reserved = true;
        self.reserved_by = Some(client_id.clone());
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Clears the reservation; the listing stays active.
    pub fn release(&mut self) {
        self.is_reserved = false;
        self.reserved_by = None;
        self.updated_at = Timestamp::now();
    }

    /// Takes the listing off the market.
    pub fn retire(&mut self) {
        self.active = false;
        self.is_reserved = false;
        self.reserved_by = None;
        self.updated_at = Timestamp::now();
    }

    pub fn record_completion(&mut self) {
        self.total_completions += 1;
        self.updated_at = Timestamp::now();
    }
}

impl OwnedByUser for ServiceListing {
    fn owner_id(&self) -> &UserId {
        &self.provider_id
    }
}
