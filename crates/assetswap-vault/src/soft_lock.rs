//! Soft-lock table: which unspent outputs are reserved, and by whom.
//!
//! Selection and marking happen under one mutex, so no caller can observe an
//! output as free between another caller's scan and mark.

use std::collections::HashMap;

use assetswap_types::{IssuerRef, PartyKey, ReservationId, StateAndRef, StateRef, TokenKind};
use parking_lot::Mutex;

use crate::LedgerStore;

/// Reserved outputs, keyed by state.
#[derive(Debug, Default)]
pub struct SoftLockTable {
    locks: Mutex<HashMap<StateRef, ReservationId>>,
}

impl SoftLockTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically select and lock unreserved outputs of `kind` owned by
    /// `owner` until their sum reaches `required`. With `issuer` set, only
    /// that issuer's tokens are candidates.
    ///
    /// Greedy in ledger order; at least one output is always selected. Either
    /// the whole selection is locked under `id` or nothing is.
    ///
    /// # Errors
    /// The unreserved total available (less than `required`) if no
    /// selection reaches it.
    pub fn reserve(
        &self,
        ledger: &dyn LedgerStore,
        owner: &PartyKey,
        kind: TokenKind,
        issuer: Option<IssuerRef>,
        required: u64,
        id: ReservationId,
    ) -> Result<Vec<StateAndRef>, u128> {
        let mut locks = self.locks.lock();
        let target = u128::from(required);

        let mut selected = Vec::new();
        let mut sum = 0u128;
        for candidate in ledger.unspent_outputs(owner, kind) {
            if sum >= target && !selected.is_empty() {
                break;
            }
            if locks.contains_key(&candidate.state_ref)
                || issuer.is_some_and(|i| i != candidate.state.amount.issuer)
            {
                continue;
            }
            sum += u128::from(candidate.state.quantity());
            selected.push(candidate);
        }

        if selected.is_empty() || sum < target {
            return Err(sum);
        }
        for state in &selected {
            locks.insert(state.state_ref, id);
        }
        Ok(selected)
    }

    /// Release every output held by `id`. Returns how many were released.
    pub fn release(&self, id: ReservationId) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, holder| *holder != id);
        before - locks.len()
    }

    #[must_use]
    pub fn is_locked(&self, state_ref: &StateRef) -> bool {
        self.locks.lock().contains_key(state_ref)
    }

    #[must_use]
    pub fn holder(&self, state_ref: &StateRef) -> Option<ReservationId> {
        self.locks.lock().get(state_ref).copied()
    }

    #[must_use]
    pub fn locked_count(&self) -> usize {
        self.locks.lock().len()
    }
}
