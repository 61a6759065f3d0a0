//! Messages exchanged during a swap negotiation.
//!
//! ```text
//! buyer ──TradeRequest──▶ seller
//! buyer ◀─SignatureRequest── seller ──SignatureRequest──▶ issuer
//! buyer ──Signature / Refused──▶ seller ◀──Signature / Refused── issuer
//! buyer ◀─Finalized / Aborted── seller ──Finalized / Aborted──▶ issuer
//! ```

use assetswap_types::{PartySignature, SignedTransaction, StateAndRef, SwapError, TradeTerms};
use serde::{Deserialize, Serialize};

/// The buyer's opening message: its reserved currency and what it wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub inputs: Vec<StateAndRef>,
    pub terms: TradeTerms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapMessage {
    TradeRequest(TradeRequest),
    /// A candidate transaction carrying the seller's signature.
    SignatureRequest { tx: SignedTransaction },
    Signature(PartySignature),
    /// The recipient of a `SignatureRequest` declined to sign.
    Refused { reason: String },
    /// The fully signed transaction as committed.
    Finalized { tx: SignedTransaction },
    /// The negotiation was abandoned; nothing was committed.
    Aborted { reason: String },
}

impl SwapMessage {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TradeRequest(_) => "TradeRequest",
            Self::SignatureRequest { .. } => "SignatureRequest",
            Self::Signature(_) => "Signature",
            Self::Refused { .. } => "Refused",
            Self::Finalized { .. } => "Finalized",
            Self::Aborted { .. } => "Aborted",
        }
    }
}

/// Protocol error for a message that arrived out of turn.
pub(crate) fn unexpected(expected: &str, got: &SwapMessage) -> SwapError {
    SwapError::Protocol {
        reason: format!("expected {expected}, got {}", got.kind()),
    }
}
