use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating an [`EngineConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The trailing burn window must cover at least one month.
    #[error("burn window must be at least one month, got {0}")]
    InvalidBurnWindow(usize),

    /// The infinite-runway sentinel must be positive.
    #[error("runway sentinel must be positive, got {0}")]
    InvalidRunwaySentinel(Decimal),
}

/// Tunables for the forecast calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Cash on hand before the first month of the horizon.
    pub opening_cash_balance: Decimal,

    /// Value reported for runway (and burn multiple) when the ratio is unbounded.
    pub runway_sentinel: Decimal,

    /// Number of trailing months averaged into the burn rate used for runway.
    pub burn_window_months: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            opening_cash_balance: Decimal::ZERO,
            runway_sentinel: Decimal::from(999),
            burn_window_months: 1,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the burn window is zero or the sentinel is
    /// not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.burn_window_months == 0 {
            return Err(ConfigError::InvalidBurnWindow(self.burn_window_months));
        }
        if self.runway_sentinel <= Decimal::ZERO {
            return Err(ConfigError::InvalidRunwaySentinel(self.runway_sentinel));
        }
        Ok(())
    }
}
