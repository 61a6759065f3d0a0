//! Intent dispatch.

use assetswap_types::{Intent, Transaction, ValidationError};

use crate::{validate_issue, validate_trade, validate_transfer};

/// Verify a transaction against the rules of its declared intent.
///
/// # Errors
/// The [`ValidationError`] from the intent's validator.
pub fn verify(tx: &Transaction) -> Result<(), ValidationError> {
    let result = match tx.intent {
        Intent::Issue => validate_issue(tx),
        Intent::Trade => validate_trade(tx),
        Intent::Transfer => validate_transfer(tx),
    };

    if let Err(err) = &result {
        tracing::debug!(
            tx = %tx.id(),
            intent = %tx.intent,
            error = %err,
            "Contract rejected transaction"
        );
    }
    result
}
