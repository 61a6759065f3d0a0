//! Supply conservation invariant checker.
//!
//! Mathematical invariant enforced by the ledger:
//! ```text
//! ∀ kind: Σ(unspent quantity) == Σ(issued quantity)
//! ```
//!
//! Trades and transfers only move tokens between owners; only issuance (and
//! seeding a ledger directly) creates supply. If the unspent total ever
//! drifts from the issued total, a transaction slipped past verification.

use std::collections::HashMap;

use assetswap_types::{Result, SwapError, TokenKind};

/// Tracks per-kind issued totals.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    issued: HashMap<TokenKind, u128>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record newly created supply.
    pub fn record_issuance(&mut self, kind: TokenKind, quantity: u64) {
        *self.issued.entry(kind).or_insert(0) += u128::from(quantity);
    }

    #[must_use]
    pub fn expected_supply(&self, kind: TokenKind) -> u128 {
        self.issued.get(&kind).copied().unwrap_or(0)
    }

    /// Compare the actual unspent total against what was issued.
    ///
    /// # Errors
    /// Returns [`SwapError::SupplyInvariantViolation`] if actual ≠ expected.
    pub fn verify(&self, kind: TokenKind, actual_supply: u128) -> Result<()> {
        let expected = self.expected_supply(kind);
        if actual_supply != expected {
            return Err(SwapError::SupplyInvariantViolation {
                reason: format!("{kind}: actual supply {actual_supply} != issued {expected}"),
            });
        }
        Ok(())
    }
}
