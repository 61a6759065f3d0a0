//! Trade rules.
//!
//! A trade swaps assets for currency between two parties:
//!
//! ```text
//!   asset seller  ──assets──▶   currency seller
//!   asset seller  ◀─currency──  currency seller
//! ```
//!
//! The asset seller is the owner of the asset inputs, the currency seller
//! the owner of the currency inputs. Each kind's inputs must come from a
//! single owner; a transaction mixing owners within one kind is rejected
//! rather than guessing which owner should be paid.

use std::collections::BTreeMap;

use assetswap_types::{
    IssuerRef, OwnableState, PartyKey, TokenKind, Transaction, ValidationError, total_quantity,
};

/// Validate a trade transaction.
///
/// Order of checks:
/// 1. both kinds have inputs, each from a single owner
/// 2. some positive currency output pays the asset seller
/// 3. some positive asset output goes to the currency seller
/// 4. asset quantity is conserved
/// 5. currency quantity is conserved
/// 6. every issuer's quantity of each kind is conserved
/// 7. every input owner is a signer
///
/// # Errors
/// The [`ValidationError`] naming the first violated rule.
pub fn validate_trade(tx: &Transaction) -> Result<(), ValidationError> {
    let asset_seller = single_input_owner(tx, TokenKind::Asset)?;
    let currency_seller = single_input_owner(tx, TokenKind::Currency)?;

    if !pays(tx, TokenKind::Currency, asset_seller) {
        return Err(ValidationError::NoPaymentToRecipient);
    }
    if !pays(tx, TokenKind::Asset, currency_seller) {
        return Err(ValidationError::NoAssetToRecipient);
    }

    let (inputs, outputs) = totals(tx, TokenKind::Asset);
    if inputs != outputs {
        return Err(ValidationError::AssetConservationViolation { inputs, outputs });
    }

    let (inputs, outputs) = totals(tx, TokenKind::Currency);
    if inputs != outputs {
        return Err(ValidationError::CurrencyConservationViolation { inputs, outputs });
    }

    check_issuers_conserved(tx)?;
    check_input_owners_signed(tx)
}

fn single_input_owner(tx: &Transaction, kind: TokenKind) -> Result<PartyKey, ValidationError> {
    let mut owners = tx.inputs_of_kind(kind).map(OwnableState::owner_key);
    let first = owners
        .next()
        .ok_or(ValidationError::MissingInputs { kind })?;
    if owners.any(|owner| owner != first) {
        return Err(ValidationError::MixedOwnerInputs { kind });
    }
    Ok(first)
}

/// Zero-quantity outputs never count as a payment.
fn pays(tx: &Transaction, kind: TokenKind, recipient: PartyKey) -> bool {
    tx.outputs_of_kind(kind)
        .any(|s| s.owner_key() == recipient && s.quantity() > 0)
}

pub(crate) fn totals(tx: &Transaction, kind: TokenKind) -> (u128, u128) {
    (
        total_quantity(tx.inputs_of_kind(kind).map(|s| &s.amount)),
        total_quantity(tx.outputs_of_kind(kind).map(|s| &s.amount)),
    )
}

/// Conservation per token: tokens keep their issuer across a transaction.
pub(crate) fn check_issuers_conserved(tx: &Transaction) -> Result<(), ValidationError> {
    let mut totals: BTreeMap<(TokenKind, IssuerRef), (u128, u128)> = BTreeMap::new();
    for input in &tx.inputs {
        let amount = &input.state.amount;
        totals.entry((amount.kind, amount.issuer)).or_default().0 += u128::from(amount.quantity);
    }
    for output in &tx.outputs {
        let amount = &output.amount;
        totals.entry((amount.kind, amount.issuer)).or_default().1 += u128::from(amount.quantity);
    }

    match totals.into_iter().find(|(_, (inputs, outputs))| inputs != outputs) {
        Some(((kind, issuer), (inputs, outputs))) => {
            Err(ValidationError::IssuerConservationViolation {
                kind,
                issuer,
                inputs,
                outputs,
            })
        }
        None => Ok(()),
    }
}

/// Nothing is spent without its owner's signature.
pub(crate) fn check_input_owners_signed(tx: &Transaction) -> Result<(), ValidationError> {
    match tx
        .inputs
        .iter()
        .map(|i| i.state.owner_key())
        .find(|owner| !tx.signers.contains(owner))
    {
        Some(owner) => Err(ValidationError::UnauthorizedSpend { owner }),
        None => Ok(()),
    }
}
