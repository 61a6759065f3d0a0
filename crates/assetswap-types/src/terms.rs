//! Terms a buyer proposes when opening a swap negotiation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, SwapError};

/// What the buyer wants and what it will pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeTerms {
    /// Asset quantity the buyer wants to receive.
    pub asset_amount: u64,
    /// Currency the buyer pays, commission included.
    pub amount_to_pay: u64,
    /// Share of `amount_to_pay` routed to the commission issuer, in `[0, 1)`.
    pub commission_rate: Decimal,
}

impl TradeTerms {
    #[must_use]
    pub fn new(asset_amount: u64, amount_to_pay: u64, commission_rate: Decimal) -> Self {
        Self {
            asset_amount,
            amount_to_pay,
            commission_rate,
        }
    }

    /// Reject terms no transaction could satisfy.
    ///
    /// # Errors
    /// - [`SwapError::InvalidTradeTerms`] for a zero asset amount or price
    /// - [`SwapError::InvalidCommissionRate`] for a rate outside `[0, 1)`
    pub fn validate(&self) -> Result<()> {
        if self.asset_amount == 0 {
            return Err(SwapError::InvalidTradeTerms {
                reason: "asset amount must be positive".into(),
            });
        }
        if self.amount_to_pay == 0 {
            return Err(SwapError::InvalidTradeTerms {
                reason: "amount to pay must be positive".into(),
            });
        }
        validate_commission_rate(self.commission_rate)
    }
}

/// Check that a commission rate lies in `[0, 1)`.
///
/// # Errors
/// Returns [`SwapError::InvalidCommissionRate`] otherwise.
pub fn validate_commission_rate(rate: Decimal) -> Result<()> {
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(SwapError::InvalidCommissionRate { rate });
    }
    Ok(())
}
