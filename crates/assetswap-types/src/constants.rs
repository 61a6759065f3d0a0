//! System-wide constants for the AssetSwap ledger.

/// Maximum quantity a single issuance transaction may create.
pub const ISSUANCE_CAP: u64 = 100;

/// Issuer reference used for self-issued assets.
pub const SELF_ISSUE_REFERENCE: u8 = 0;

/// Default number of attempts the concurrency guard makes before giving up.
pub const DEFAULT_RESERVATION_ATTEMPTS: u32 = 30;

/// Lower bound of the randomized backoff between reservation attempts (ms).
pub const DEFAULT_BACKOFF_MIN_MS: u64 = 0;

/// Upper bound of the randomized backoff between reservation attempts (ms).
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 5;

/// How long a session waits for a counterparty message (ms).
pub const DEFAULT_SESSION_TIMEOUT_MS: u64 = 30_000;

/// Default commission rate in hundredths (5 = 0.05).
pub const DEFAULT_COMMISSION_RATE_HUNDREDTHS: i64 = 5;

/// Domain separator for transaction ids.
pub const TX_DOMAIN: &[u8] = b"assetswap:tx:v1:";

/// Domain separator for genesis (seeded) state refs.
pub const GENESIS_DOMAIN: &[u8] = b"assetswap:genesis:v1:";

