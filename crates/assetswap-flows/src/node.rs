//! A party's swap node: identity, ledger access and configuration wired
//! into the flows it can run.

use std::sync::Arc;

use assetswap_types::{Identity, Party, Result, SwapConfig, TradeTerms};
use assetswap_vault::{ConcurrencyGuard, LedgerStore, SoftLockTable};

use crate::{CommissionCosigner, IssueFlow, Observer, SwapInitiator, SwapResponder};

/// Everything a party needs to issue, buy, sell and co-sign.
///
/// Every flow started from one node shares its [`ConcurrencyGuard`], so
/// concurrent negotiations never select the same output.
#[derive(Clone)]
pub struct SwapNode {
    identity: Arc<Identity>,
    ledger: Arc<dyn LedgerStore>,
    guard: ConcurrencyGuard,
    config: SwapConfig,
    observer: Option<Observer>,
}

impl SwapNode {
    /// # Errors
    /// Returns [`SwapError::Configuration`](assetswap_types::SwapError::Configuration)
    /// if `config` is invalid.
    pub fn new(identity: Identity, ledger: Arc<dyn LedgerStore>, config: SwapConfig) -> Result<Self> {
        Self::with_table(identity, ledger, Arc::new(SoftLockTable::new()), config)
    }

    /// A node sharing a soft-lock table with other nodes over the same ledger.
    ///
    /// # Errors
    /// Returns [`SwapError::Configuration`](assetswap_types::SwapError::Configuration)
    /// if `config` is invalid.
    pub fn with_table(
        identity: Identity,
        ledger: Arc<dyn LedgerStore>,
        table: Arc<SoftLockTable>,
        config: SwapConfig,
    ) -> Result<Self> {
        config.validate()?;
        let guard = ConcurrencyGuard::with_table(ledger.clone(), table, config.reservation.clone());
        tracing::info!(
            party = %identity.party(),
            max_attempts = config.reservation.max_attempts,
            session_timeout_ms = config.session_timeout_ms,
            "Swap node ready"
        );
        Ok(Self {
            identity: Arc::new(identity),
            ledger,
            guard,
            config,
            observer: None,
        })
    }

    /// Report every transaction this node finalizes to `observer`.
    #[must_use]
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn party(&self) -> &Party {
        self.identity.party()
    }

    #[must_use]
    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    #[must_use]
    pub fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    #[must_use]
    pub fn issue_flow(&self) -> IssueFlow {
        let flow = IssueFlow::new(self.identity.clone(), self.ledger.clone());
        match &self.observer {
            Some(observer) => flow.with_observer(observer.clone()),
            None => flow,
        }
    }

    /// Buy `asset_amount` for `amount_to_pay` at the node's default commission rate.
    #[must_use]
    pub fn buy(&self, asset_amount: u64, amount_to_pay: u64) -> SwapInitiator {
        self.buy_with_terms(self.config.terms(asset_amount, amount_to_pay))
    }

    #[must_use]
    pub fn buy_with_terms(&self, terms: TradeTerms) -> SwapInitiator {
        SwapInitiator::new(self.identity.clone(), self.guard.clone(), terms)
    }

    /// Serve one buyer, routing commission to `commission_recipient`.
    #[must_use]
    pub fn sell(&self, commission_recipient: Party) -> SwapResponder {
        let responder =
            SwapResponder::new(self.identity.clone(), self.guard.clone(), commission_recipient);
        match &self.observer {
            Some(observer) => responder.with_observer(observer.clone()),
            None => responder,
        }
    }

    #[must_use]
    pub fn cosign(&self) -> CommissionCosigner {
        CommissionCosigner::new(self.identity.clone())
    }
}
