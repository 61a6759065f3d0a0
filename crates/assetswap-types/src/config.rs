//! Configuration types for AssetSwap nodes.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, SwapError, TradeTerms, constants, validate_commission_rate};

/// Retry policy of the concurrency guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Attempts before failing with `InsufficientBalance`.
    pub max_attempts: u32,
    /// Lower bound of the uniform random backoff between attempts (ms).
    pub backoff_min_ms: u64,
    /// Upper bound (inclusive) of the backoff between attempts (ms).
    pub backoff_max_ms: u64,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_attempts: constants::DEFAULT_RESERVATION_ATTEMPTS,
            backoff_min_ms: constants::DEFAULT_BACKOFF_MIN_MS,
            backoff_max_ms: constants::DEFAULT_BACKOFF_MAX_MS,
        }
    }
}

impl ReservationConfig {
    /// Single attempt, no backoff: fail as soon as outputs are unavailable.
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff_min_ms: 0,
            backoff_max_ms: 0,
        }
    }

    /// # Errors
    /// Returns [`SwapError::Configuration`] for zero attempts or an inverted range.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SwapError::Configuration(
                "reservation.max_attempts must be > 0".into(),
            ));
        }
        if self.backoff_min_ms > self.backoff_max_ms {
            return Err(SwapError::Configuration(format!(
                "reservation backoff range inverted: {} > {}",
                self.backoff_min_ms, self.backoff_max_ms
            )));
        }
        Ok(())
    }
}

/// Configuration for a node taking part in swaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapConfig {
    pub reservation: ReservationConfig,
    /// How long to wait for any single counterparty message (ms).
    pub session_timeout_ms: u64,
    /// Commission rate used when a buyer doesn't specify one.
    pub default_commission_rate: Decimal,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            reservation: ReservationConfig::default(),
            session_timeout_ms: constants::DEFAULT_SESSION_TIMEOUT_MS,
            default_commission_rate: Decimal::new(constants::DEFAULT_COMMISSION_RATE_HUNDREDTHS, 2),
        }
    }
}

impl SwapConfig {
    #[must_use]
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }

    /// Terms at this node's default commission rate.
    #[must_use]
    pub fn terms(&self, asset_amount: u64, amount_to_pay: u64) -> TradeTerms {
        TradeTerms::new(asset_amount, amount_to_pay, self.default_commission_rate)
    }

    /// # Errors
    /// Returns [`SwapError::Configuration`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.reservation.validate()?;
        if self.session_timeout_ms == 0 {
            return Err(SwapError::Configuration(
                "session_timeout_ms must be > 0".into(),
            ));
        }
        validate_commission_rate(self.default_commission_rate)
            .map_err(|e| SwapError::Configuration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_defaults() {
        let cfg = ReservationConfig::default();
        assert_eq!(cfg.max_attempts, 30);
        assert_eq!(cfg.backoff_min_ms, 0);
        assert_eq!(cfg.backoff_max_ms, 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn swap_defaults() {
        let cfg = SwapConfig::default();
        assert_eq!(cfg.default_commission_rate, Decimal::new(5, 2));
        assert_eq!(cfg.session_timeout(), Duration::from_secs(30));
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.terms(10, 100).commission_rate, Decimal::new(5, 2));
    }

    #[test]
    fn invalid_configs_rejected() {
        let mut cfg = SwapConfig::default();
        cfg.reservation.max_attempts = 0;
        assert!(matches!(cfg.validate(), Err(SwapError::Configuration(_))));

        let mut cfg = SwapConfig::default();
        cfg.reservation.backoff_min_ms = 10;
        assert!(matches!(cfg.validate(), Err(SwapError::Configuration(_))));

        let mut cfg = SwapConfig::default();
        cfg.default_commission_rate = Decimal::ONE;
        assert!(matches!(cfg.validate(), Err(SwapError::Configuration(_))));
    }

    #[test]
    fn swap_config_serde_roundtrip() {
        let cfg = SwapConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SwapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
