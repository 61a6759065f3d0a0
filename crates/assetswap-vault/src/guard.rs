//! Concurrency guard: the only way a flow may claim unspent outputs.
//!
//! [`ConcurrencyGuard::try_reserve`] runs the atomic select-and-mark of the
//! [`SoftLockTable`] and, while the unreserved pool falls short, retries
//! with a uniform random backoff so in-flight reservations get a chance to
//! release. The returned [`Reservation`] releases its outputs when dropped.

use std::{sync::Arc, time::Duration};

use assetswap_types::{
    IssuerRef, PartyKey, ReservationConfig, ReservationId, Result, StateAndRef, StateRef, SwapError,
    TokenKind,
};
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{LedgerStore, SoftLockTable};

/// Outputs held for one negotiation. Released on drop.
#[derive(Debug)]
pub struct Reservation {
    id: ReservationId,
    owner: PartyKey,
    kind: TokenKind,
    states: Vec<StateAndRef>,
    table: Arc<SoftLockTable>,
    acquired_at: DateTime<Utc>,
    attempts: u32,
}

impl Reservation {
    #[must_use]
    pub fn id(&self) -> ReservationId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> &PartyKey {
        &self.owner
    }

    #[must_use]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The reserved states, in selection order.
    #[must_use]
    pub fn states(&self) -> &[StateAndRef] {
        &self.states
    }

    #[must_use]
    pub fn state_refs(&self) -> Vec<StateRef> {
        self.states.iter().map(|s| s.state_ref).collect()
    }

    /// Sum of the reserved quantities.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.states
            .iter()
            .map(|s| u128::from(s.state.quantity()))
            .sum()
    }

    #[must_use]
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// How many attempts it took to acquire.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Release now rather than at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        let released = self.table.release(self.id);
        tracing::debug!(
            reservation = %self.id,
            owner = %self.owner,
            kind = %self.kind,
            released,
            held_ms = (Utc::now() - self.acquired_at).num_milliseconds(),
            "Reservation released"
        );
    }
}

/// Serializes access to the unspent-output pool.
#[derive(Clone)]
pub struct ConcurrencyGuard {
    ledger: Arc<dyn LedgerStore>,
    table: Arc<SoftLockTable>,
    config: ReservationConfig,
}

impl ConcurrencyGuard {
    /// A guard with its own soft-lock table.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, config: ReservationConfig) -> Self {
        Self::with_table(ledger, Arc::new(SoftLockTable::new()), config)
    }

    /// A guard sharing `table` with other guards over the same ledger.
    #[must_use]
    pub fn with_table(
        ledger: Arc<dyn LedgerStore>,
        table: Arc<SoftLockTable>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            ledger,
            table,
            config,
        }
    }

    #[must_use]
    pub fn table(&self) -> &Arc<SoftLockTable> {
        &self.table
    }

    #[must_use]
    pub fn ledger(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    /// Reserve unspent outputs of `kind` owned by `owner` summing to at
    /// least `required`.
    ///
    /// # Errors
    /// Returns [`SwapError::InsufficientBalance`] once `max_attempts` are
    /// exhausted without the unreserved pool covering `required`.
    pub async fn try_reserve(
        &self,
        owner: &PartyKey,
        kind: TokenKind,
        required: u64,
    ) -> Result<Reservation> {
        self.reserve_matching(owner, kind, None, required).await
    }

    /// As [`try_reserve`](Self::try_reserve), counting only tokens issued
    /// under `issuer`.
    ///
    /// # Errors
    /// Returns [`SwapError::InsufficientBalance`] once `max_attempts` are
    /// exhausted without `issuer`'s unreserved tokens covering `required`.
    pub async fn try_reserve_issued(
        &self,
        owner: &PartyKey,
        kind: TokenKind,
        issuer: IssuerRef,
        required: u64,
    ) -> Result<Reservation> {
        self.reserve_matching(owner, kind, Some(issuer), required).await
    }

    async fn reserve_matching(
        &self,
        owner: &PartyKey,
        kind: TokenKind,
        issuer: Option<IssuerRef>,
        required: u64,
    ) -> Result<Reservation> {
        let id = ReservationId::new();
        let max_attempts = self.config.max_attempts.max(1);
        let mut available = 0u128;

        for attempt in 1..=max_attempts {
            match self
                .table
                .reserve(self.ledger.as_ref(), owner, kind, issuer, required, id)
            {
                Ok(states) => {
                    let reservation = Reservation {
                        id,
                        owner: *owner,
                        kind,
                        states,
                        table: Arc::clone(&self.table),
                        acquired_at: Utc::now(),
                        attempts: attempt,
                    };
                    tracing::debug!(
                        reservation = %id,
                        owner = %owner,
                        kind = %kind,
                        required,
                        reserved = reservation.total(),
                        outputs = reservation.states.len(),
                        attempt,
                        "Outputs reserved"
                    );
                    return Ok(reservation);
                }
                Err(free) => {
                    available = free;
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff_delay()).await;
                    }
                }
            }
        }

        tracing::warn!(
            owner = %owner,
            kind = %kind,
            required,
            available,
            attempts = max_attempts,
            "Reservation failed: insufficient unreserved balance"
        );
        Err(SwapError::InsufficientBalance {
            kind,
            needed: required,
            available,
            attempts: max_attempts,
        })
    }

    fn backoff_delay(&self) -> Duration {
        let (min, max) = (self.config.backoff_min_ms, self.config.backoff_max_ms);
        let ms = if max <= min {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        Duration::from_millis(ms)
    }
}
