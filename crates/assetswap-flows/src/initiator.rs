//! Buyer side of a swap: pays currency, receives assets.

use std::{collections::HashSet, sync::Arc};

use assetswap_contract::validate_trade;
use assetswap_types::{
    Identity, Result, SignedTransaction, StateRef, SwapError, TokenKind, TradeTerms,
};
use assetswap_vault::{ConcurrencyGuard, Reservation};

use crate::{
    MessageChannel, SwapMessage, TradeRequest,
    channel::send_best_effort,
    message::unexpected,
    proposal::{await_finalized, check_attached_signatures, require_trade_signer},
};

/// Opens a negotiation with an asset holder.
pub struct SwapInitiator {
    identity: Arc<Identity>,
    guard: ConcurrencyGuard,
    terms: TradeTerms,
}

impl SwapInitiator {
    #[must_use]
    pub fn new(identity: Arc<Identity>, guard: ConcurrencyGuard, terms: TradeTerms) -> Self {
        Self {
            identity,
            guard,
            terms,
        }
    }

    #[must_use]
    pub fn terms(&self) -> &TradeTerms {
        &self.terms
    }

    /// Run the buyer's half of the protocol against the seller on `channel`.
    ///
    /// Currency covering `amount_to_pay` stays reserved until this returns,
    /// whatever the outcome.
    ///
    /// # Errors
    /// - [`SwapError::InsufficientBalance`] if currency can't be reserved
    /// - [`SwapError::TermsMismatch`] or the violated trade rule if the
    ///   seller's candidate is unacceptable (the seller is told `Refused`)
    /// - [`SwapError::CounterpartyAborted`] if the seller gave up
    /// - channel errors
    pub async fn run<C>(&self, channel: &mut C) -> Result<SignedTransaction>
    where
        C: MessageChannel + ?Sized,
    {
        self.terms.validate()?;
        let reservation = self
            .guard
            .try_reserve(&self.identity.key(), TokenKind::Currency, self.terms.amount_to_pay)
            .await?;

        tracing::debug!(
            buyer = %self.identity.party(),
            seller = %channel.counterparty(),
            asset_amount = self.terms.asset_amount,
            amount_to_pay = self.terms.amount_to_pay,
            offered = reservation.total(),
            "Opening swap"
        );
        channel
            .send(SwapMessage::TradeRequest(TradeRequest {
                inputs: reservation.states().to_vec(),
                terms: self.terms,
            }))
            .await?;

        let outcome = self.negotiate(channel, &reservation).await;
        match &outcome {
            Ok(stx) => tracing::info!(tx = %stx.id(), buyer = %self.identity.party(), "Swap finalized"),
            Err(err) => tracing::warn!(buyer = %self.identity.party(), error = %err, "Swap failed"),
        }
        outcome
    }

    async fn negotiate<C>(&self, channel: &mut C, reservation: &Reservation) -> Result<SignedTransaction>
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

        if let Err(err) = self.check_candidate(&candidate, reservation) {
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
        await_finalized(channel, candidate.id()).await
    }

    /// Accept only a valid trade that spends nothing of ours beyond what we
    /// offered, gives us exactly the requested assets, and costs exactly
    /// the agreed price.
    fn check_candidate(&self, candidate: &SignedTransaction, reservation: &Reservation) -> Result<()> {
        let tx = &candidate.tx;
        let me = self.identity.key();
        require_trade_signer(tx, &me)?;
        validate_trade(tx)?;

        let offered: HashSet<StateRef> = reservation.state_refs().into_iter().collect();
        if let Some(extra) = tx
            .inputs
            .iter()
            .find(|i| i.state.owner_key() == me && !offered.contains(&i.state_ref))
        {
            return Err(SwapError::TermsMismatch {
                reason: format!("spends {} which was not offered", extra.state_ref),
            });
        }

        let received: u128 = tx
            .outputs_of_kind(TokenKind::Asset)
            .filter(|o| o.owner_key() == me)
            .map(|o| u128::from(o.quantity()))
            .sum();
        if received != u128::from(self.terms.asset_amount) {
            return Err(SwapError::TermsMismatch {
                reason: format!(
                    "receives {received} assets, asked for {}",
                    self.terms.asset_amount
                ),
            });
        }

        let spent: u128 = tx
            .inputs_of_kind(TokenKind::Currency)
            .filter(|i| i.owner_key() == me)
            .map(|i| u128::from(i.quantity()))
            .sum();
        let change: u128 = tx
            .outputs_of_kind(TokenKind::Currency)
            .filter(|o| o.owner_key() == me)
            .map(|o| u128::from(o.quantity()))
            .sum();
        let paid = spent.saturating_sub(change);
        if paid != u128::from(self.terms.amount_to_pay) {
            return Err(SwapError::TermsMismatch {
                reason: format!(
                    "pays {paid} currency, agreed {}",
                    self.terms.amount_to_pay
                ),
            });
        }

        check_attached_signatures(candidate)
    }
}
