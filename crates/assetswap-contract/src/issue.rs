//! Issuance rules.
//!
//! An issue transaction creates new asset supply from nothing:
//! no inputs, exactly one output, a quantity in `(0, ISSUANCE_CAP]`,
//! signed by exactly the output's participants, self-issued by its owner.

use std::collections::BTreeSet;

use assetswap_types::{PartyKey, TokenKind, Transaction, ValidationError, constants};

/// Validate an issue transaction. Checks run in a fixed order and the
/// first failure is returned.
///
/// # Errors
/// The [`ValidationError`] naming the violated rule.
pub fn validate_issue(tx: &Transaction) -> Result<(), ValidationError> {
    if !tx.inputs.is_empty() {
        return Err(ValidationError::NoInputsAllowed {
            found: tx.inputs.len(),
        });
    }

    let [output] = tx.outputs.as_slice() else {
        return Err(ValidationError::SingleOutputRequired {
            found: tx.outputs.len(),
        });
    };

    if output.quantity() == 0 {
        return Err(ValidationError::NonPositiveAmount);
    }

    // Set equality: a missing owner and an extra signer both fail.
    let participants: BTreeSet<PartyKey> = output.participants().into_iter().collect();
    if tx.signers != participants {
        return Err(ValidationError::SignerMismatch);
    }

    if output.quantity() > constants::ISSUANCE_CAP {
        return Err(ValidationError::IssuanceCapExceeded {
            quantity: output.quantity(),
            cap: constants::ISSUANCE_CAP,
        });
    }

    if output.kind() != TokenKind::Asset || output.amount.issuer.party != output.owner_key() {
        return Err(ValidationError::NotSelfIssued);
    }

    Ok(())
}
