//! Transfer rules: tokens change hands with no counter-leg.

use assetswap_types::{TokenKind, Transaction, ValidationError};

use crate::trade::{check_input_owners_signed, check_issuers_conserved, totals};

/// Validate a transfer: something is consumed, every token is conserved
/// under its own issuer, and every input owner signed.
///
/// # Errors
/// The [`ValidationError`] naming the first violated rule.
pub fn validate_transfer(tx: &Transaction) -> Result<(), ValidationError> {
    if tx.inputs.is_empty() {
        return Err(ValidationError::EmptyTransfer);
    }

    for kind in [TokenKind::Asset, TokenKind::Currency] {
        let (inputs, outputs) = totals(tx, kind);
        if inputs != outputs {
            return Err(ValidationError::TransferConservationViolation {
                kind,
                inputs,
                outputs,
            });
        }
    }

    check_issuers_conserved(tx)?;
    check_input_owners_signed(tx)
}
