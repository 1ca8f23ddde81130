//! Provider revenue counters.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, Money, UserId};

/// Running totals per provider, only ever incremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    pub provider_id: UserId,
    pub total_revenue: Money,
    pub completed_count: u64,
}

impl ProviderStats {
    pub fn empty(provider_id: UserId) -> Self {
        Self {
            provider_id,
            total_revenue: Money::ZERO,
            completed_count: 0,
        }
    }

    /// Adds one confirmed payment. On overflow nothing changes.
    pub fn record_payment(&mut self, amount: Money) -> Result<(), DomainError> {
        let total_revenue = self.total_revenue.try_add(amount)?;
        let completed_count = self.completed_count.checked_add(1).ok_or_else(|| {
            DomainError::new(ErrorCode::InternalError, "Completed payment count is out of range")
                .with_detail("provider_id", self.provider_id.to_string())
        })?;
        self.total_revenue = total_revenue;
        self.completed_count = completed_count;
        Ok(())
    }
}
