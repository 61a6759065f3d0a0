//! Currency issuer's side of a swap: checks and co-signs the trade that
//! routes it a commission.

use std::sync::Arc;

use assetswap_types::{Identity, Result, SignedTransaction, SwapError};

use crate::{
    MessageChannel, SwapMessage,
    channel::send_best_effort,
    message::unexpected,
    proposal::{await_finalized, check_attached_signatures, require_trade_signer},
};

/// Answers one seller's signature request.
pub struct CommissionCosigner {
    identity: Arc<Identity>,
}

impl CommissionCosigner {
    #[must_use]
    pub fn new(identity: Arc<Identity>) -> Self {
        Self { identity }
    }

    /// Co-sign the seller's candidate if the contract accepts it, then wait
    /// for the outcome.
    ///
    /// # Errors
    /// The reason the candidate was refused (the seller is told `Refused`),
    /// [`SwapError::CounterpartyAborted`] if the seller gave up, or channel
    /// errors.
    pub async fn run<C>(&self, channel: &mut C) -> Result<SignedTransaction>
    where
        C: MessageChannel + ?Sized,
    {
        let candidate = match channel.receive().await? {
            SwapMessage::SignatureRequest { tx } => tx,
            SwapMessage::Aborted { reason } => {
                return Err(SwapError::CounterpartyAborted { reason });
            }
            other => return Err(unexpected("SignatureRequest", &other)),
        };

        if let Err(err) = self.check(&candidate) {
            tracing::warn!(
                tx = %candidate.id(),
                seller = %channel.counterparty(),
                error = %err,
                "Refusing to co-sign"
            );
            send_best_effort(
                channel,
                SwapMessage::Refused {
                    reason: err.to_string(),
                },
            )
            .await;
            return Err(err);
        }

        channel
            .send(SwapMessage::Signature(
                self.identity.sign_transaction(&candidate.tx),
            ))
            .await?;
        tracing::debug!(tx = %candidate.id(), issuer = %self.identity.party(), "Co-signed trade");
        await_finalized(channel, candidate.id()).await
    }

    fn check(&self, candidate: &SignedTransaction) -> Result<()> {
        require_trade_signer(&candidate.tx, &self.identity.key())?;
        assetswap_contract::verify(&candidate.tx)?;
        check_attached_signatures(candidate)
    }
}
