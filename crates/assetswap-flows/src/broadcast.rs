//! Observer notification.
//!
//! Every finalized transaction is reported to a non-participant observer
//! (a regulator). Notification failure is logged and never rolls anything
//! back: by the time we notify, the transaction is already final.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use assetswap_types::{Party, PartyKey, Result, SignedTransaction, SwapError, TxId};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Delivers finalized transactions to an observer.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// # Errors
    /// [`SwapError::Broadcast`] if the observer could not be reached.
    async fn notify(&self, observer: &Party, tx: &SignedTransaction) -> Result<()>;
}

/// An observer and how to reach it.
#[derive(Clone)]
pub struct Observer {
    pub party: Party,
    pub broadcaster: Arc<dyn Broadcaster>,
}

impl Observer {
    #[must_use]
    pub fn new(party: Party, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { party, broadcaster }
    }

    /// Notify, logging (not returning) any failure.
    pub async fn notify(&self, tx: &SignedTransaction) {
        match self.broadcaster.notify(&self.party, tx).await {
            Ok(()) => tracing::debug!(tx = %tx.id(), observer = %self.party, "Observer notified"),
            Err(err) => tracing::warn!(
                tx = %tx.id(),
                observer = %self.party,
                error = %err,
                "Observer notification failed"
            ),
        }
    }
}

/// In-memory broadcaster recording what each observer received.
#[derive(Debug, Default)]
pub struct ObserverLog {
    received: Mutex<Vec<(PartyKey, TxId)>>,
    failing: AtomicBool,
}

impl ObserverLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent notification fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Transactions delivered to `observer`, in delivery order.
    #[must_use]
    pub fn received_by(&self, observer: &PartyKey) -> Vec<TxId> {
        self.received
            .lock()
            .iter()
            .filter(|(k, _)| k == observer)
            .map(|(_, id)| *id)
            .collect()
    }
}

#[async_trait]
impl Broadcaster for ObserverLog {
    async fn notify(&self, observer: &Party, tx: &SignedTransaction) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SwapError::Broadcast {
                reason: format!("{observer} unreachable"),
            });
        }
        self.received.lock().push((observer.key, tx.id()));
        Ok(())
    }
}
