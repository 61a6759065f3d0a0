//! # assetswap-flows
//!
//! **The interactive side of AssetSwap**: asset issuance and the three-party
//! asset/currency swap.
//!
//! ## Roles
//!
//! - [`SwapInitiator`] (buyer): reserves currency, opens the negotiation,
//!   checks the candidate against its terms before signing
//! - [`SwapResponder`] (seller): reserves assets, computes change and
//!   commission, builds and signs the trade, collects co-signatures, commits
//! - [`CommissionCosigner`] (currency issuer): verifies and co-signs the
//!   trade that pays it commission
//! - [`IssueFlow`]: self-issues a new asset
//!
//! All collaborators are injected: the ledger through
//! [`LedgerStore`](assetswap_vault::LedgerStore), counterparties through a
//! [`MessageChannel`], the regulator through a [`Broadcaster`].
//! [`SwapNode`] wires one party's collaborators together.
//!
//! ## Swap Lifecycle
//!
//! ```text
//! buyer: reserve currency ─▶ TradeRequest
//! seller: reserve assets → split → build → sign ─▶ SignatureRequest (buyer, issuer)
//! buyer, issuer: verify → Signature
//! seller: commit ─▶ notify observer ─▶ Finalized (buyer, issuer)
//! ```
//!
//! Any failure sends `Aborted`, commits nothing, and releases every
//! reservation.

pub mod broadcast;
pub mod channel;
pub mod cosigner;
pub mod initiator;
pub mod issue;
pub mod message;
pub mod node;
mod proposal;
pub mod responder;

pub use broadcast::{Broadcaster, Observer, ObserverLog};
pub use channel::{LocalSession, MessageChannel};
pub use cosigner::CommissionCosigner;
pub use initiator::SwapInitiator;
pub use issue::IssueFlow;
pub use message::{SwapMessage, TradeRequest};
pub use node::SwapNode;
pub use responder::{FailureReason, ResponderPhase, SwapResponder};
