//! Fungible token amounts.
//!
//! Two token kinds exist on the ledger:
//! - **Asset**: issued by its own owner (self-issuance)
//! - **Currency**: issued by a distinguished issuer party
//!
//! Quantities are whole units (`u64`); there are no fractional units.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PartyKey, constants};

/// The closed set of token kinds a state can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TokenKind {
    /// An owned asset, self-issued by its first owner.
    Asset,
    /// Currency units, issued by the currency issuer.
    Currency,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset => write!(f, "ASSET"),
            Self::Currency => write!(f, "CURRENCY"),
        }
    }
}

/// The issuer-scoped part of a token: who issued it, under which reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IssuerRef {
    pub party: PartyKey,
    pub reference: u8,
}

impl IssuerRef {
    #[must_use]
    pub fn new(party: PartyKey, reference: u8) -> Self {
        Self { party, reference }
    }
}

impl fmt::Display for IssuerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.party, self.reference)
    }
}

/// A quantity of a typed, issuer-scoped fungible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub issuer: IssuerRef,
    pub quantity: u64,
    pub kind: TokenKind,
}

impl TokenAmount {
    /// A self-issued asset amount.
    #[must_use]
    pub fn asset(issuer: PartyKey, quantity: u64) -> Self {
        Self {
            issuer: IssuerRef::new(issuer, constants::SELF_ISSUE_REFERENCE),
            quantity,
            kind: TokenKind::Asset,
        }
    }

    /// A currency amount issued by `issuer`.
    #[must_use]
    pub fn currency(issuer: PartyKey, quantity: u64) -> Self {
        Self {
            issuer: IssuerRef::new(issuer, 0),
            quantity,
            kind: TokenKind::Currency,
        }
    }

    /// Same token (issuer and kind), different quantity.
    #[must_use]
    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self { quantity, ..*self }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.quantity == 0
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} issued by {}",
            self.quantity, self.kind, self.issuer.party
        )
    }
}

/// Sum of quantities, widened so that no realistic set of states overflows.
pub fn total_quantity<'a>(amounts: impl IntoIterator<Item = &'a TokenAmount>) -> u128 {
    amounts.into_iter().map(|a| u128::from(a.quantity)).sum()
}
