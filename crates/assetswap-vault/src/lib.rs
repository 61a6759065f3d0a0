//! # assetswap-vault
//!
//! **Unspent-output state and its single writer.**
//!
//! ## Architecture
//!
//! 1. **LedgerStore**: the narrow interface to the ledger: list a party's
//!    unspent outputs, commit (notarize + persist) a signed transaction
//! 2. **InMemoryLedger**: a notarizing in-process ledger implementing it
//! 3. **SoftLockTable**: which unspent outputs are currently reserved, and by whom
//! 4. **ConcurrencyGuard**: atomic greedy selection with bounded, randomized
//!    retry; hands out RAII [`Reservation`]s
//!
//! ## Reservation Flow
//!
//! ```text
//! try_reserve() → [lock table → scan unreserved → select → mark] → Reservation
//!     → ... negotiation ... → commit() consumes inputs → drop(Reservation)
//! ```
//!
//! A reservation is released when dropped, on every path, so a failed
//! negotiation never strands outputs.

pub mod guard;
pub mod ledger;
pub mod soft_lock;
pub mod supply;

pub use guard::{ConcurrencyGuard, Reservation};
pub use ledger::{InMemoryLedger, LedgerStore};
pub use soft_lock::SoftLockTable;
pub use supply::SupplyConservation;
