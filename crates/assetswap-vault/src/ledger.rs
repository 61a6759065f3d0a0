//! Ledger store: the unspent-output pool and the commit (finality) step.
//!
//! [`LedgerStore`] is the narrow interface the flows talk to. The
//! [`InMemoryLedger`] implements it as a notarizing, single-process ledger:
//! commit verifies the contract, every required signature, and that every
//! input is still unspent, then consumes inputs and records outputs in one
//! critical section.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, Ordering},
};

use assetswap_types::{
    CommitError, Intent, OwnableState, PartyKey, Result, SignedTransaction, StateAndRef, StateRef,
    TokenKind, TxId,
};
use async_trait::async_trait;
use parking_lot::RwLock;

use crate::SupplyConservation;

/// Narrow interface to the ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Unspent outputs of `kind` owned by `owner`, oldest first.
    ///
    /// Synchronous so the concurrency guard can call it inside its critical
    /// section.
    fn unspent_outputs(&self, owner: &PartyKey, kind: TokenKind) -> Vec<StateAndRef>;

    /// Notarize and persist a fully signed transaction.
    ///
    /// # Errors
    /// A [`CommitError`] describing why finality was refused.
    async fn commit(&self, stx: &SignedTransaction) -> std::result::Result<TxId, CommitError>;
}

#[derive(Debug, Default)]
struct Inner {
    /// Unspent state → (insertion sequence, state).
    unspent: HashMap<StateRef, (u64, OwnableState)>,
    /// Consumed state → consuming transaction.
    consumed: HashMap<StateRef, TxId>,
    transactions: HashMap<TxId, SignedTransaction>,
    next_sequence: u64,
    genesis_counter: u64,
    supply: SupplyConservation,
}

impl Inner {
    fn insert_unspent(&mut self, state_ref: StateRef, state: OwnableState) {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        self.unspent.insert(state_ref, (seq, state));
    }

    fn check_inputs(&self, stx: &SignedTransaction) -> std::result::Result<(), CommitError> {
        let mut seen = HashSet::with_capacity(stx.tx.inputs.len());
        for input in &stx.tx.inputs {
            let state_ref = input.state_ref;
            if !seen.insert(state_ref) || self.consumed.contains_key(&state_ref) {
                return Err(CommitError::DoubleSpend(state_ref));
            }
            match self.unspent.get(&state_ref) {
                None => return Err(CommitError::UnknownInput(state_ref)),
                Some((_, recorded)) if recorded != &input.state => {
                    return Err(CommitError::StateMismatch(state_ref));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn unspent_total(&self, kind: TokenKind) -> u128 {
        self.unspent
            .values()
            .filter(|(_, s)| s.kind() == kind)
            .map(|(_, s)| u128::from(s.quantity()))
            .sum()
    }
}

/// In-process notarizing ledger.
#[derive(Debug)]
pub struct InMemoryLedger {
    inner: RwLock<Inner>,
    available: AtomicBool,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Seed a state directly, outside any transaction. Counts as new supply.
    pub fn deposit(&self, state: OwnableState) -> StateAndRef {
        let mut inner = self.inner.write();
        let state_ref = StateRef::new(TxId::genesis(inner.genesis_counter), 0);
        inner.genesis_counter += 1;
        inner.supply.record_issuance(state.kind(), state.quantity());
        inner.insert_unspent(state_ref, state.clone());
        tracing::debug!(
            state = %state_ref,
            owner = %state.owner_key(),
            kind = %state.kind(),
            quantity = state.quantity(),
            "Deposited state"
        );
        StateAndRef::new(state_ref, state)
    }

    /// Simulate the notary going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Total unspent quantity of `kind` owned by `owner`.
    #[must_use]
    pub fn balance(&self, owner: &PartyKey, kind: TokenKind) -> u128 {
        self.inner
            .read()
            .unspent
            .values()
            .filter(|(_, s)| s.owner_key() == *owner && s.kind() == kind)
            .map(|(_, s)| u128::from(s.quantity()))
            .sum()
    }

    #[must_use]
    pub fn is_consumed(&self, state_ref: &StateRef) -> bool {
        self.inner.read().consumed.contains_key(state_ref)
    }

    /// The transaction that consumed `state_ref`, if any.
    #[must_use]
    pub fn consumed_by(&self, state_ref: &StateRef) -> Option<TxId> {
        self.inner.read().consumed.get(state_ref).copied()
    }

    #[must_use]
    pub fn transaction(&self, id: &TxId) -> Option<SignedTransaction> {
        self.inner.read().transactions.get(id).cloned()
    }

    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.inner.read().transactions.len()
    }

    /// Check that the unspent total of `kind` equals everything ever issued.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if they differ.
    pub fn verify_supply(&self, kind: TokenKind) -> Result<()> {
        let inner = self.inner.read();
        inner.supply.verify(kind, inner.unspent_total(kind))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    fn unspent_outputs(&self, owner: &PartyKey, kind: TokenKind) -> Vec<StateAndRef> {
        let inner = self.inner.read();
        let mut found: Vec<(u64, StateAndRef)> = inner
            .unspent
            .iter()
            .filter(|(_, (_, s))| s.owner_key() == *owner && s.kind() == kind)
            .map(|(r, (seq, s))| (*seq, StateAndRef::new(*r, s.clone())))
            .collect();
        found.sort_by_key(|(seq, _)| *seq);
        found.into_iter().map(|(_, s)| s).collect()
    }

    async fn commit(&self, stx: &SignedTransaction) -> std::result::Result<TxId, CommitError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(CommitError::Unavailable {
                reason: "notary offline".into(),
            });
        }

        let tx_id = stx.id();
        if self.inner.read().transactions.contains_key(&tx_id) {
            return Err(CommitError::AlreadyCommitted(tx_id));
        }

        assetswap_contract::verify(&stx.tx)?;
        stx.verify_fully_signed()?;

        let mut inner = self.inner.write();
        // Re-checked under the write lock: a racing commit may have landed.
        if inner.transactions.contains_key(&tx_id) {
            return Err(CommitError::AlreadyCommitted(tx_id));
        }
        inner.check_inputs(stx)?;

        for input in &stx.tx.inputs {
            inner.unspent.remove(&input.state_ref);
            inner.consumed.insert(input.state_ref, tx_id);
        }
        for (index, output) in (0u32..).zip(&stx.tx.outputs) {
            inner.insert_unspent(StateRef::new(tx_id, index), output.clone());
        }
        if stx.tx.intent == Intent::Issue {
            for output in &stx.tx.outputs {
                inner.supply.record_issuance(output.kind(), output.quantity());
            }
        }
        inner.transactions.insert(tx_id, stx.clone());
        drop(inner);

        tracing::info!(
            tx = %tx_id,
            intent = %stx.tx.intent,
            inputs = stx.tx.inputs.len(),
            outputs = stx.tx.outputs.len(),
            "Transaction committed"
        );
        Ok(tx_id)
    }
}
