//! Money value object.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

use super::{DomainError, ErrorCode, ValidationError};

/// Non-float monetary amount in the marketplace currency.
///
/// Amounts are trusted as claimed; only non-negativity is enforced. Addition
/// is checked: totals over stored documents report overflow as an error
/// instead of panicking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount, rejecting negative values.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::invalid_format("amount", "amount cannot be negative"));
        }
        Ok(Self(value))
    }

    /// Whole currency units, e.g. `Money::from_major(500)` is ₱500.
    pub fn from_major(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// `None` when the sum is out of range.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Adds `rhs`, failing with `InternalError` on overflow.
    pub fn try_add(self, rhs: Self) -> Result<Self, DomainError> {
        self.checked_add(rhs).ok_or_else(|| overflow(self, rhs))
    }

    /// Sums `amounts`, failing with `InternalError` on overflow.
    pub fn try_sum(amounts: impl IntoIterator<Item = Self>) -> Result<Self, DomainError> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.try_add(amount))
    }
}

fn overflow(lhs: Money, rhs: Money) -> DomainError {
    DomainError::new(ErrorCode::InternalError, "Amount total is out of range")
        .with_detail("lhs", lhs.to_string())
        .with_detail("rhs", rhs.to_string())
}

/// Signed difference; callers that need a Money must re-validate.
impl Sub for Money {
    type Output = Decimal;
    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
