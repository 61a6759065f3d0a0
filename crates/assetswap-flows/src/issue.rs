//! Self-issuance of a new asset.

use std::sync::Arc;

use assetswap_contract::validate_issue;
use assetswap_types::{
    Identity, Intent, OwnableState, Result, SignedTransaction, TokenAmount, Transaction,
};
use assetswap_vault::LedgerStore;

use crate::Observer;

/// Issues assets to the identity that runs it.
pub struct IssueFlow {
    identity: Arc<Identity>,
    ledger: Arc<dyn LedgerStore>,
    observer: Option<Observer>,
}

impl IssueFlow {
    #[must_use]
    pub fn new(identity: Arc<Identity>, ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            identity,
            ledger,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Build, check, sign and commit an issuance of `quantity` units.
    ///
    /// # Errors
    /// The violated issue rule (checked locally before anything is signed),
    /// or the ledger's [`CommitError`](assetswap_types::CommitError).
    pub async fn issue(&self, quantity: u64) -> Result<SignedTransaction> {
        let owner = self.identity.party();
        let tx = Transaction::new(Intent::Issue)
            .with_output(OwnableState::new(
                TokenAmount::asset(owner.key, quantity),
                owner.clone(),
            ))
            .with_signer(owner.key);
        validate_issue(&tx)?;

        let mut stx = SignedTransaction::new(tx);
        stx.sign_with(&self.identity)?;
        let tx_id = self.ledger.commit(&stx).await?;
        tracing::info!(tx = %tx_id, owner = %owner, quantity, "Asset issued");

        if let Some(observer) = &self.observer {
            observer.notify(&stx).await;
        }
        Ok(stx)
    }
}
