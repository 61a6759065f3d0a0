//! # assetswap-types
//!
//! Shared types, errors, and configuration for the **AssetSwap** ledger.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PartyKey`], [`TxId`], [`StateRef`], [`ReservationId`]
//! - **Token model**: [`TokenKind`], [`IssuerRef`], [`TokenAmount`]
//! - **State model**: [`Party`], [`OwnableState`], [`StateAndRef`]
//! - **Transaction model**: [`Intent`], [`Transaction`], [`SignedTransaction`], [`PartySignature`]
//! - **Signing**: [`Identity`]
//! - **Swap terms**: [`TradeTerms`]
//! - **Configuration**: [`SwapConfig`], [`ReservationConfig`]
//! - **Errors**: [`SwapError`], [`ValidationError`], [`CommitError`] with `AS_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod ids;
pub mod state;
pub mod terms;
pub mod token;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use assetswap_types::{OwnableState, Transaction, TokenKind, ...};

pub use config::*;
pub use error::*;
pub use identity::*;
pub use ids::*;
pub use state::*;
pub use terms::*;
pub use token::*;
pub use transaction::*;

// Constants are accessed via `assetswap_types::constants::FOO`
// (not re-exported to avoid name collisions).
