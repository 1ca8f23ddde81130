//! Revenue reconciliation configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::revenue::ReconciliationPolicy;

/// Report windows and display settings
#[derive(Debug, Clone, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default = "default_window_days")]
    pub current_window_days: u32,

    #[serde(default = "default_window_days")]
    pub prior_window_days: u32,

    /// Services listed in the breakdown before the rest is folded away
    #[serde(default = "default_top_services")]
    pub top_services: usize,

    /// Prefix used when amounts are rendered into message text
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl ReconciliationConfig {
    pub fn policy(&self) -> ReconciliationPolicy {
        ReconciliationPolicy {
            current_window_days: self.current_window_days,
            prior_window_days: self.prior_window_days,
            top_services: self.top_services,
        }
    }

    /// Validate reconciliation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for days in [self.current_window_days, self.prior_window_days] {
            if days == 0 || days > 366 {
                return Err(ValidationError::InvalidWindow);
            }
        }
        if self.top_services == 0 {
            return Err(ValidationError::InvalidTopServices);
        }
        if self.currency_symbol.is_empty() {
            return Err(ValidationError::MissingRequired("RECONCILIATION__CURRENCY_SYMBOL"));
        }
        Ok(())
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            current_window_days: default_window_days(),
            prior_window_days: default_window_days(),
            top_services: default_top_services(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_window_days() -> u32 {
    30
}

fn default_top_services() -> usize {
    5
}

fn default_currency_symbol() -> String {
    "₱".to_string()
}
