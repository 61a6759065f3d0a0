//! Seller side of a swap: selects assets, builds and finalizes the trade.
//!
//! ## Phases
//!
//! ```text
//! AwaitRequest → SelectingInputs → BuildingTransaction → AwaitingCosignatures → Finalizing → Done
//!       └──────────────┴─────────────────┴──────────────────────┴──────────────────┴──→ Failed
//! ```
//!
//! Nothing reaches the ledger before `Finalizing`, and the ledger commit is
//! atomic, so every failure leaves the unspent-output pool as it was.

use std::{fmt, sync::Arc};

use assetswap_contract::{
    SplitInput, TradeParties, build_trade_outputs, compute_split, sum_quantities, validate_trade,
};
use assetswap_types::{
    CommitError, Identity, Intent, IssuerRef, Party, Result, SignedTransaction, SwapError,
    TokenKind, Transaction, ValidationError, constants,
};
use assetswap_vault::{ConcurrencyGuard, Reservation};

use crate::{
    MessageChannel, Observer, SwapMessage, TradeRequest, channel::send_best_effort,
    message::unexpected,
};

/// Why a negotiation failed, by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Not enough unreserved assets.
    InsufficientBalance,
    /// The request or the split it implies is impossible.
    InvalidRequest,
    /// The candidate transaction broke a contract rule.
    Rejected(ValidationError),
    /// A co-signer refused, or sent a bad signature.
    Cosigning,
    /// The ledger refused finality.
    Commit(CommitError),
    /// Channel failure or out-of-turn message.
    Protocol,
}

impl From<&SwapError> for FailureReason {
    fn from(err: &SwapError) -> Self {
        match err {
            SwapError::InsufficientBalance { .. } => Self::InsufficientBalance,
            SwapError::Validation(v) => Self::Rejected(v.clone()),
            SwapError::InsufficientCurrencyOffered { .. }
            | SwapError::InsufficientAssetOffered { .. }
            | SwapError::InvalidCommissionRate { .. }
            | SwapError::InvalidTradeTerms { .. }
            | SwapError::TermsMismatch { .. }
            | SwapError::QuantityOverflow => Self::InvalidRequest,
            SwapError::SignatureInvalid { .. }
            | SwapError::UnexpectedSigner { .. }
            | SwapError::SignatureRefused { .. } => Self::Cosigning,
            SwapError::Commit(c) => Self::Commit(c.clone()),
            _ => Self::Protocol,
        }
    }
}

/// Where the seller is in a negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderPhase {
    AwaitRequest,
    SelectingInputs,
    BuildingTransaction,
    AwaitingCosignatures,
    Finalizing,
    Done,
    Failed(FailureReason),
}

impl ResponderPhase {
    /// Phases only move forward; `Failed` is reachable from any non-terminal phase.
    #[must_use]
    pub fn can_transition_to(&self, target: &Self) -> bool {
        match (self, target) {
            (Self::Done | Self::Failed(_), _) => false,
            (_, Self::Failed(_)) => true,
            _ => matches!(
                (self, target),
                (Self::AwaitRequest, Self::SelectingInputs)
                    | (Self::SelectingInputs, Self::BuildingTransaction)
                    | (Self::BuildingTransaction, Self::AwaitingCosignatures)
                    | (Self::AwaitingCosignatures, Self::Finalizing)
                    | (Self::Finalizing, Self::Done)
            ),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for ResponderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitRequest => write!(f, "AWAIT_REQUEST"),
            Self::SelectingInputs => write!(f, "SELECTING_INPUTS"),
            Self::BuildingTransaction => write!(f, "BUILDING_TRANSACTION"),
            Self::AwaitingCosignatures => write!(f, "AWAITING_COSIGNATURES"),
            Self::Finalizing => write!(f, "FINALIZING"),
            Self::Done => write!(f, "DONE"),
            Self::Failed(reason) => write!(f, "FAILED({reason:?})"),
        }
    }
}

/// Handles one buyer's request. Create one per negotiation.
pub struct SwapResponder {
    identity: Arc<Identity>,
    guard: ConcurrencyGuard,
    commission_recipient: Party,
    observer: Option<Observer>,
    phase: ResponderPhase,
}

impl SwapResponder {
    /// `commission_recipient` is the currency issuer: it receives the
    /// commission leg and must co-sign every trade.
    #[must_use]
    pub fn new(identity: Arc<Identity>, guard: ConcurrencyGuard, commission_recipient: Party) -> Self {
        Self {
            identity,
            guard,
            commission_recipient,
            observer: None,
            phase: ResponderPhase::AwaitRequest,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    #[must_use]
    pub fn phase(&self) -> &ResponderPhase {
        &self.phase
    }

    /// Serve one request from the buyer on `buyer`, collecting the issuer's
    /// co-signature on `issuer`.
    ///
    /// On failure both counterparties are sent `Aborted` and the reserved
    /// assets are released.
    ///
    /// # Errors
    /// Whatever ended the negotiation; a [`CommitError`] is surfaced unchanged.
    pub async fn run<B, I>(&mut self, buyer: &mut B, issuer: &mut I) -> Result<SignedTransaction>
    where
        B: MessageChannel + ?Sized,
        I: MessageChannel + ?Sized,
    {
        match self.negotiate(buyer, issuer).await {
            Ok(stx) => Ok(stx),
            Err(err) => {
                self.fail(&err);
                let abort = SwapMessage::Aborted {
                    reason: err.to_string(),
                };
                send_best_effort(buyer, abort.clone()).await;
                send_best_effort(issuer, abort).await;
                Err(err)
            }
        }
    }

    async fn negotiate<B, I>(&mut self, buyer: &mut B, issuer: &mut I) -> Result<SignedTransaction>
    where
        B: MessageChannel + ?Sized,
        I: MessageChannel + ?Sized,
    {
        let request = match buyer.receive().await? {
            SwapMessage::TradeRequest(request) => request,
            other => return Err(unexpected("TradeRequest", &other)),
        };
        let buyer_party = buyer.counterparty().clone();

        self.advance(ResponderPhase::SelectingInputs)?;
        self.check_request(&request, &buyer_party)?;
        let reservation = self
            .guard
            .try_reserve_issued(
                &self.identity.key(),
                TokenKind::Asset,
                IssuerRef::new(self.identity.key(), constants::SELF_ISSUE_REFERENCE),
                request.terms.asset_amount,
            )
            .await?;

        self.advance(ResponderPhase::BuildingTransaction)?;
        let mut stx = self.build(&request, &reservation, buyer_party)?;

        self.advance(ResponderPhase::AwaitingCosignatures)?;
        let signature_request = SwapMessage::SignatureRequest { tx: stx.clone() };
        buyer.send(signature_request.clone()).await?;
        issuer.send(signature_request).await?;
        collect_signature(buyer, &mut stx).await?;
        collect_signature(issuer, &mut stx).await?;

        self.advance(ResponderPhase::Finalizing)?;
        let tx_id = self.guard.ledger().commit(&stx).await?;
        drop(reservation);

        if let Some(observer) = &self.observer {
            observer.notify(&stx).await;
        }
        let finalized = SwapMessage::Finalized { tx: stx.clone() };
        send_best_effort(buyer, finalized.clone()).await;
        send_best_effort(issuer, finalized).await;

        self.advance(ResponderPhase::Done)?;
        tracing::info!(
            tx = %tx_id,
            seller = %self.identity.party(),
            buyer = %buyer.counterparty(),
            asset_amount = request.terms.asset_amount,
            amount_to_pay = request.terms.amount_to_pay,
            "Swap committed"
        );
        Ok(stx)
    }

    /// The buyer may only offer its own currency, issued by the commission
    /// recipient.
    fn check_request(&self, request: &TradeRequest, buyer: &Party) -> Result<()> {
        request.terms.validate()?;
        if request.inputs.is_empty() {
            return Err(SwapError::InvalidTradeTerms {
                reason: "no currency inputs offered".into(),
            });
        }
        if let Some(bad) = request
            .inputs
            .iter()
            .find(|i| i.state.kind() != TokenKind::Currency || i.state.owner_key() != buyer.key)
        {
            return Err(SwapError::TermsMismatch {
                reason: format!("offered input {} is not the buyer's currency", bad.state_ref),
            });
        }
        if let Some(foreign) = request
            .inputs
            .iter()
            .find(|i| i.state.amount.issuer.party != self.commission_recipient.key)
        {
            return Err(SwapError::TermsMismatch {
                reason: format!(
                    "offered input {} is issued by {}, not {}",
                    foreign.state_ref, foreign.state.amount.issuer, self.commission_recipient
                ),
            });
        }
        Ok(())
    }

    fn build(
        &self,
        request: &TradeRequest,
        reservation: &Reservation,
        buyer: Party,
    ) -> Result<SignedTransaction> {
        let (Some(asset), Some(currency)) = (reservation.states().first(), request.inputs.first())
        else {
            return Err(SwapError::Internal("trade built without inputs".into()));
        };

        let split = compute_split(&SplitInput {
            sum_input_currency: sum_quantities(&request.inputs)?,
            amount_to_pay: request.terms.amount_to_pay,
            commission_rate: request.terms.commission_rate,
            sum_input_asset: sum_quantities(reservation.states())?,
            asset_amount_requested: request.terms.asset_amount,
        })?;
        let parties = TradeParties {
            buyer,
            seller: self.identity.party().clone(),
            commission_recipient: self.commission_recipient.clone(),
        };
        let outputs =
            build_trade_outputs(&split, &asset.state.amount, &currency.state.amount, &parties);

        let tx = Transaction::new(Intent::Trade)
            .with_inputs(reservation.states().iter().cloned())
            .with_inputs(request.inputs.iter().cloned())
            .with_outputs(outputs)
            .with_signers([
                parties.seller.key,
                parties.buyer.key,
                parties.commission_recipient.key,
            ]);
        validate_trade(&tx)?;

        tracing::debug!(
            tx = %tx.id(),
            commission = split.commission,
            seller_proceeds = split.seller_proceeds,
            buyer_change = split.buyer_currency_change,
            seller_asset_change = split.seller_asset_change,
            "Candidate trade built"
        );
        let mut stx = SignedTransaction::new(tx);
        stx.sign_with(&self.identity)?;
        Ok(stx)
    }

    fn advance(&mut self, next: ResponderPhase) -> Result<()> {
        if !self.phase.can_transition_to(&next) {
            return Err(SwapError::Internal(format!(
                "responder cannot move from {} to {next}",
                self.phase
            )));
        }
        tracing::debug!(from = %self.phase, to = %next, "Responder phase");
        self.phase = next;
        Ok(())
    }

    fn fail(&mut self, err: &SwapError) {
        let failed = ResponderPhase::Failed(FailureReason::from(err));
        if self.phase.can_transition_to(&failed) {
            tracing::warn!(from = %self.phase, error = %err, "Swap negotiation failed");
            self.phase = failed;
        }
    }
}

/// Receive one co-signature from the party on `channel` and attach it.
async fn collect_signature<C>(channel: &mut C, stx: &mut SignedTransaction) -> Result<()>
where
    C: MessageChannel + ?Sized,
{
    let party = channel.counterparty().key;
    match channel.receive().await? {
        SwapMessage::Signature(signature) => {
            if signature.by != party {
                return Err(SwapError::UnexpectedSigner {
                    party: signature.by,
                });
            }
            stx.add_signature(signature)?;
            tracing::debug!(tx = %stx.id(), signer = %party, "Co-signature received");
            Ok(())
        }
        SwapMessage::Refused { reason } => Err(SwapError::SignatureRefused { party, reason }),
        other => Err(unexpected("Signature", &other)),
    }
}
