//! # assetswap-contract
//!
//! **Pure contract verification for AssetSwap.**
//!
//! Everything here is a function of one transaction (or one set of numbers):
//!
//! - **Zero side effects**: no ledger access, no reservations, no I/O
//! - **Deterministic**: every party reaches the same verdict on the same transaction
//! - **Fail fast**: the first violated rule is returned, never an aggregate
//!
//! Verification dispatches on the transaction's [`Intent`](assetswap_types::Intent):
//! Issue, Trade and Transfer each have their own validator. Races between
//! transactions are invisible here; the vault's concurrency guard and the
//! ledger's commit step handle those.

pub mod dispatch;
pub mod issue;
pub mod split;
pub mod trade;
pub mod transfer;

pub use dispatch::verify;
pub use issue::validate_issue;
pub use split::{SplitInput, TradeParties, TradeSplit, build_trade_outputs, compute_split, sum_quantities};
pub use trade::validate_trade;
pub use transfer::validate_transfer;
