//! Checks shared by every party asked to sign someone else's transaction.

use assetswap_types::{
    CommitError, Intent, PartyKey, Result, SignedTransaction, SwapError, Transaction, TxId,
};

use crate::{MessageChannel, SwapMessage, message::unexpected};

/// The candidate must be a trade that names `me` as a required signer.
pub(crate) fn require_trade_signer(tx: &Transaction, me: &PartyKey) -> Result<()> {
    if tx.intent != Intent::Trade {
        return Err(SwapError::TermsMismatch {
            reason: format!("expected a TRADE transaction, got {}", tx.intent),
        });
    }
    if !tx.signers.contains(me) {
        return Err(SwapError::TermsMismatch {
            reason: format!("{me} is not a required signer"),
        });
    }
    Ok(())
}

/// Every signature already attached must verify.
pub(crate) fn check_attached_signatures(stx: &SignedTransaction) -> Result<()> {
    stx.verify_signatures().map_err(|err| match err {
        CommitError::InvalidSignature(party) => SwapError::SignatureInvalid { party },
        other => other.into(),
    })
}

/// Wait for the seller's verdict on the transaction we signed.
pub(crate) async fn await_finalized<C>(channel: &mut C, expected: TxId) -> Result<SignedTransaction>
where
    C: MessageChannel + ?Sized,
{
    match channel.receive().await? {
        SwapMessage::Finalized { tx } => {
            if tx.id() != expected {
                return Err(SwapError::Protocol {
                    reason: format!("finalized {} but signed {expected}", tx.id()),
                });
            }
            tx.verify_fully_signed()?;
            Ok(tx)
        }
        SwapMessage::Aborted { reason } => Err(SwapError::CounterpartyAborted { reason }),
        other => Err(unexpected("Finalized", &other)),
    }
}
