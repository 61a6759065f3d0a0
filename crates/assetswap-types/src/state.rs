//! Ledger states.
//!
//! States are immutable value objects. "Changing ownership" always means
//! producing a *new* state as a transaction output and consuming the old
//! one as an input; nothing is mutated in place.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{PartyKey, StateRef, TokenAmount, TokenKind};

/// A named ledger participant. Parties compare by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub key: PartyKey,
}

impl Party {
    #[must_use]
    pub fn new(name: impl Into<String>, key: PartyKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }
}

impl PartialEq for Party {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Party {}

impl std::hash::Hash for Party {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key.short())
    }
}

/// A token amount held by a single owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnableState {
    pub amount: TokenAmount,
    pub owner: Party,
}

impl OwnableState {
    #[must_use]
    pub fn new(amount: TokenAmount, owner: Party) -> Self {
        Self { amount, owner }
    }

    /// Keys of every party that must agree to changes of this state.
    #[must_use]
    pub fn participants(&self) -> Vec<PartyKey> {
        vec![self.owner.key]
    }

    #[must_use]
    pub fn owner_key(&self) -> PartyKey {
        self.owner.key
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.amount.kind
    }

    #[must_use]
    pub fn quantity(&self) -> u64 {
        self.amount.quantity
    }

    /// A copy of this state assigned to `new_owner`.
    #[must_use]
    pub fn with_new_owner(&self, new_owner: Party) -> Self {
        Self {
            amount: self.amount,
            owner: new_owner,
        }
    }

    /// A copy of this state's token with a different owner and quantity.
    #[must_use]
    pub fn with_new_owner_and_quantity(&self, new_owner: Party, quantity: u64) -> Self {
        Self {
            amount: self.amount.with_quantity(quantity),
            owner: new_owner,
        }
    }
}

/// A state together with the reference it is recorded under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state_ref: StateRef,
    pub state: OwnableState,
}

impl StateAndRef {
    #[must_use]
    pub fn new(state_ref: StateRef, state: OwnableState) -> Self {
        Self { state_ref, state }
    }
}

/// Dummy states for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl OwnableState {
    /// A self-issued asset held by `owner`.
    pub fn dummy_asset(owner: &Party, quantity: u64) -> Self {
        Self::new(TokenAmount::asset(owner.key, quantity), owner.clone())
    }

    /// Currency issued by `issuer` held by `owner`.
    pub fn dummy_currency(issuer: &Party, owner: &Party, quantity: u64) -> Self {
        Self::new(TokenAmount::currency(issuer.key, quantity), owner.clone())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl StateAndRef {
    /// Wrap a state under a random, never-committed reference.
    pub fn dummy(state: OwnableState) -> Self {
        Self::new(
            StateRef::new(crate::TxId(rand::random::<[u8; 32]>()), 0),
            state,
        )
    }
}
