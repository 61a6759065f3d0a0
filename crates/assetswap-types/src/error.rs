//! Error types for the AssetSwap ledger.
//!
//! All errors use the `AS_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Contract validation errors ([`ValidationError`])
//! - 2xx: Balance / reservation errors
//! - 3xx: Change and commission calculation errors
//! - 4xx: Commit / finality errors ([`CommitError`])
//! - 5xx: Swap protocol errors
//! - 6xx: Observer notification errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{IssuerRef, PartyKey, StateRef, TokenKind, TxId};

/// A violated contract rule. Always names the specific rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // =================================================================
    // Issue (100-109)
    // =================================================================
    /// An issuance consumed inputs.
    #[error("AS_ERR_100: No inputs should be consumed when issuing an asset (found {found})")]
    NoInputsAllowed { found: usize },

    /// An issuance produced zero or several outputs.
    #[error("AS_ERR_101: Only one output state should be created when issuing an asset (found {found})")]
    SingleOutputRequired { found: usize },

    /// An issuance created a zero quantity.
    #[error("AS_ERR_102: A newly issued asset must have a positive amount")]
    NonPositiveAmount,

    /// The signer set differs from the issued state's participants.
    #[error("AS_ERR_103: Owner must sign asset issue transaction, and only the owner")]
    SignerMismatch,

    /// An issuance exceeded the per-transaction cap.
    #[error("AS_ERR_104: Cannot issue more than {cap} assets at a time (requested {quantity})")]
    IssuanceCapExceeded { quantity: u64, cap: u64 },

    /// The issued state is not an asset issued by its own owner.
    #[error("AS_ERR_105: Issued state must be an asset issued by its owner")]
    NotSelfIssued,

    // =================================================================
    // Trade (110-119)
    // =================================================================
    /// A trade has no inputs of one of the two token kinds.
    #[error("AS_ERR_110: Trade has no {kind} inputs")]
    MissingInputs { kind: TokenKind },

    /// Inputs of one kind belong to more than one owner.
    #[error("AS_ERR_111: {kind} inputs must all belong to a single owner")]
    MixedOwnerInputs { kind: TokenKind },

    /// No currency output is owned by the asset seller.
    #[error("AS_ERR_112: There must be output currency paid to the recipient")]
    NoPaymentToRecipient,

    /// No asset output is owned by the currency seller.
    #[error("AS_ERR_113: There must be output assets paid to the recipient")]
    NoAssetToRecipient,

    /// Total asset quantity changed.
    #[error("AS_ERR_114: Total input assets ({inputs}) must equal total output assets ({outputs})")]
    AssetConservationViolation { inputs: u128, outputs: u128 },

    /// Total currency quantity changed.
    #[error("AS_ERR_115: Total input currency ({inputs}) must equal total output currency ({outputs})")]
    CurrencyConservationViolation { inputs: u128, outputs: u128 },

    /// One issuer's token of some kind was created, destroyed or relabelled.
    #[error(
        "AS_ERR_116: Total input {kind} issued by {issuer} ({inputs}) must equal total output ({outputs})"
    )]
    IssuerConservationViolation {
        kind: TokenKind,
        issuer: IssuerRef,
        inputs: u128,
        outputs: u128,
    },

    // =================================================================
    // Transfer (120-129)
    // =================================================================
    /// A transfer consumed nothing.
    #[error("AS_ERR_120: A transfer must consume at least one input")]
    EmptyTransfer,

    /// A transfer created or destroyed tokens of some kind.
    #[error("AS_ERR_121: Total input {kind} ({inputs}) must equal total output {kind} ({outputs})")]
    TransferConservationViolation {
        kind: TokenKind,
        inputs: u128,
        outputs: u128,
    },

    /// An input owner is not among the signers (transfers and trades).
    #[error("AS_ERR_122: Input owner {owner} must sign the transaction")]
    UnauthorizedSpend { owner: PartyKey },
}

/// Failure reported by the ledger's notarization / finality step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// An input was already consumed by a committed transaction.
    #[error("AS_ERR_400: Double spend: {0} already consumed")]
    DoubleSpend(StateRef),

    /// An input is not recorded on the ledger.
    #[error("AS_ERR_401: Unknown input state {0}")]
    UnknownInput(StateRef),

    /// An input's content differs from what the ledger recorded.
    #[error("AS_ERR_402: Input {0} does not match the recorded state")]
    StateMismatch(StateRef),

    /// Required signers have not signed.
    #[error("AS_ERR_403: {} required signature(s) missing", .missing.len())]
    MissingSignatures { missing: Vec<PartyKey> },

    /// A signature failed verification.
    #[error("AS_ERR_404: Invalid signature from {0}")]
    InvalidSignature(PartyKey),

    /// The contract rejected the transaction.
    #[error("AS_ERR_405: Contract rejected transaction: {0}")]
    Rejected(#[from] ValidationError),

    /// This exact transaction was already committed.
    #[error("AS_ERR_406: Transaction {0} already committed")]
    AlreadyCommitted(TxId),

    /// The notary / ledger could not be reached.
    #[error("AS_ERR_407: Ledger unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Central error enum for all AssetSwap operations.
#[derive(Debug, Error)]
pub enum SwapError {
    // =================================================================
    // Validation (1xx)
    // =================================================================
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =================================================================
    // Balance / Reservation Errors (2xx)
    // =================================================================
    /// The concurrency guard exhausted its attempts.
    #[error(
        "AS_ERR_200: Insufficient {kind} balance: need {needed}, unreserved {available} after {attempts} attempt(s)"
    )]
    InsufficientBalance {
        kind: TokenKind,
        needed: u64,
        available: u128,
        attempts: u32,
    },

    // =================================================================
    // Calculator Errors (3xx)
    // =================================================================
    /// The buyer's currency inputs don't cover the price.
    #[error("AS_ERR_300: Insufficient currency offered: need {required}, offered {offered}")]
    InsufficientCurrencyOffered { offered: u64, required: u64 },

    /// The seller's asset inputs don't cover the requested amount.
    #[error("AS_ERR_301: Insufficient assets offered: need {required}, offered {offered}")]
    InsufficientAssetOffered { offered: u64, required: u64 },

    /// Commission rate outside `[0, 1)`.
    #[error("AS_ERR_302: Commission rate {rate} must be in [0, 1)")]
    InvalidCommissionRate { rate: Decimal },

    /// Trade terms are structurally invalid.
    #[error("AS_ERR_303: Invalid trade terms: {reason}")]
    InvalidTradeTerms { reason: String },

    // =================================================================
    // Commit Errors (4xx)
    // =================================================================
    #[error(transparent)]
    Commit(#[from] CommitError),

    // =================================================================
    // Protocol Errors (5xx)
    // =================================================================
    /// Malformed or out-of-order counterparty message.
    #[error("AS_ERR_500: Protocol error: {reason}")]
    Protocol { reason: String },

    /// A counterparty signature didn't verify.
    #[error("AS_ERR_501: Signature from {party} failed verification")]
    SignatureInvalid { party: PartyKey },

    /// A signature from a key that isn't a required signer.
    #[error("AS_ERR_502: {party} is not a required signer")]
    UnexpectedSigner { party: PartyKey },

    /// A counterparty refused to sign.
    #[error("AS_ERR_503: {party} refused to sign: {reason}")]
    SignatureRefused { party: PartyKey, reason: String },

    /// The counterparty abandoned the negotiation.
    #[error("AS_ERR_504: Counterparty aborted: {reason}")]
    CounterpartyAborted { reason: String },

    /// The proposed transaction doesn't match the agreed terms.
    #[error("AS_ERR_505: Proposal does not match terms: {reason}")]
    TermsMismatch { reason: String },

    /// The channel to the counterparty is closed.
    #[error("AS_ERR_506: Channel to counterparty closed")]
    ChannelClosed,

    /// No message arrived within the session timeout.
    #[error("AS_ERR_507: Timed out after {waited_ms}ms waiting for counterparty")]
    Timeout { waited_ms: u64 },

    // =================================================================
    // Observer Errors (6xx)
    // =================================================================
    /// The observer could not be notified.
    #[error("AS_ERR_600: Observer notification failed: {reason}")]
    Broadcast { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("AS_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("AS_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("AS_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// A quantity sum doesn't fit in 64 bits.
    #[error("AS_ERR_903: Quantity overflow")]
    QuantityOverflow,

    /// Supply conservation invariant violated.
    #[error("AS_ERR_904: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SwapError>;

impl From<serde_json::Error> for SwapError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
