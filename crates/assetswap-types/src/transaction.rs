//! Transactions and signatures.
//!
//! A [`Transaction`] consumes resolved input states, produces new output
//! states, and carries exactly one [`Intent`] plus the set of keys that must
//! sign it. Its [`TxId`] is a SHA-256 over a domain-separated canonical
//! encoding, so every party computes the same id for the same content.
//!
//! A [`SignedTransaction`] accumulates ed25519 signatures over that id.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    CommitError, Identity, OwnableState, PartyKey, StateAndRef, StateRef, SwapError, TokenKind,
    TxId, constants, verify_signature,
};

/// The single intent a transaction declares. Closed: verification dispatch
/// matches exhaustively on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    /// Create new asset supply from nothing.
    Issue,
    /// Swap assets for currency between two parties.
    Trade,
    /// Move tokens between owners without a counter-leg.
    Transfer,
}

impl Intent {
    fn tag(self) -> u8 {
        match self {
            Self::Issue => 0,
            Self::Trade => 1,
            Self::Transfer => 2,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "ISSUE"),
            Self::Trade => write!(f, "TRADE"),
            Self::Transfer => write!(f, "TRANSFER"),
        }
    }
}

/// An unsigned ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Consumed states, in order, resolved against the ledger.
    pub inputs: Vec<StateAndRef>,
    /// Produced states, in order.
    pub outputs: Vec<OwnableState>,
    pub intent: Intent,
    /// Keys whose signatures are required.
    pub signers: BTreeSet<PartyKey>,
}

impl Transaction {
    #[must_use]
    pub fn new(intent: Intent) -> Self {
        Self {
            inputs: Vec::new(),
            outputs: Vec::new(),
            intent,
            signers: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: StateAndRef) -> Self {
        self.inputs.push(input);
        self
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = StateAndRef>) -> Self {
        self.inputs.extend(inputs);
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: OwnableState) -> Self {
        self.outputs.push(output);
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = OwnableState>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    #[must_use]
    pub fn with_signer(mut self, key: PartyKey) -> Self {
        self.signers.insert(key);
        self
    }

    #[must_use]
    pub fn with_signers(mut self, keys: impl IntoIterator<Item = PartyKey>) -> Self {
        self.signers.extend(keys);
        self
    }

    /// The ids of the consumed states.
    #[must_use]
    pub fn input_refs(&self) -> Vec<StateRef> {
        self.inputs.iter().map(|i| i.state_ref).collect()
    }

    pub fn inputs_of_kind(&self, kind: TokenKind) -> impl Iterator<Item = &OwnableState> {
        self.inputs
            .iter()
            .map(|i| &i.state)
            .filter(move |s| s.kind() == kind)
    }

    pub fn outputs_of_kind(&self, kind: TokenKind) -> impl Iterator<Item = &OwnableState> {
        self.outputs.iter().filter(move |s| s.kind() == kind)
    }

    /// Canonical encoding hashed into the transaction id.
    ///
    /// Format: `"assetswap:tx:v1:" || intent || inputs (refs) || outputs || signers`,
    /// every variable-length section prefixed by its little-endian length.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(256);
        payload.extend_from_slice(constants::TX_DOMAIN);
        payload.push(self.intent.tag());

        payload.extend_from_slice(&(self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            payload.extend_from_slice(input.state_ref.tx_id.as_bytes());
            payload.extend_from_slice(&input.state_ref.index.to_le_bytes());
        }

        payload.extend_from_slice(&(self.outputs.len() as u64).to_le_bytes());
        for output in &self.outputs {
            payload.push(match output.kind() {
                TokenKind::Asset => 0,
                TokenKind::Currency => 1,
            });
            payload.extend_from_slice(output.amount.issuer.party.as_bytes());
            payload.push(output.amount.issuer.reference);
            payload.extend_from_slice(&output.quantity().to_le_bytes());
            payload.extend_from_slice(output.owner.key.as_bytes());
            payload.extend_from_slice(&(output.owner.name.len() as u64).to_le_bytes());
            payload.extend_from_slice(output.owner.name.as_bytes());
        }

        payload.extend_from_slice(&(self.signers.len() as u64).to_le_bytes());
        for key in &self.signers {
            payload.extend_from_slice(key.as_bytes());
        }
        payload
    }

    #[must_use]
    pub fn id(&self) -> TxId {
        TxId(Sha256::digest(self.signing_payload()).into())
    }
}

/// One party's signature over a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartySignature {
    pub by: PartyKey,
    pub bytes: Vec<u8>,
}

/// A transaction plus the signatures gathered so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: Transaction,
    /// At most one signature per signer, in the order they were added.
    pub signatures: Vec<PartySignature>,
}

impl SignedTransaction {
    #[must_use]
    pub fn new(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TxId {
        self.tx.id()
    }

    /// Sign with our own identity.
    ///
    /// # Errors
    /// Returns [`SwapError::UnexpectedSigner`] if the identity is not a required signer.
    pub fn sign_with(&mut self, identity: &Identity) -> crate::Result<()> {
        let signature = identity.sign_transaction(&self.tx);
        self.add_signature(signature)
    }

    /// Attach a counterparty's signature after checking it.
    ///
    /// # Errors
    /// - [`SwapError::UnexpectedSigner`] if `by` is not a required signer
    /// - [`SwapError::SignatureInvalid`] if the signature doesn't verify
    pub fn add_signature(&mut self, signature: PartySignature) -> crate::Result<()> {
        if !self.tx.signers.contains(&signature.by) {
            return Err(SwapError::UnexpectedSigner {
                party: signature.by,
            });
        }
        if !verify_signature(&signature.by, self.id().as_bytes(), &signature.bytes) {
            return Err(SwapError::SignatureInvalid {
                party: signature.by,
            });
        }
        self.signatures.retain(|s| s.by != signature.by);
        self.signatures.push(signature);
        Ok(())
    }

    #[must_use]
    pub fn is_signed_by(&self, key: &PartyKey) -> bool {
        self.signatures.iter().any(|s| &s.by == key)
    }

    /// Required signers that have not signed yet.
    #[must_use]
    pub fn missing_signers(&self) -> Vec<PartyKey> {
        self.tx
            .signers
            .iter()
            .filter(|k| !self.is_signed_by(k))
            .copied()
            .collect()
    }

    /// Verify every attached signature against the transaction id.
    ///
    /// # Errors
    /// Returns [`CommitError::InvalidSignature`] for the first signature that
    /// fails, or that was made by a key outside `signers`.
    pub fn verify_signatures(&self) -> Result<(), CommitError> {
        let id = self.id();
        for signature in &self.signatures {
            if !self.tx.signers.contains(&signature.by)
                || !verify_signature(&signature.by, id.as_bytes(), &signature.bytes)
            {
                return Err(CommitError::InvalidSignature(signature.by));
            }
        }
        Ok(())
    }

    /// Verify every signature and require that every signer has signed.
    ///
    /// # Errors
    /// [`CommitError::InvalidSignature`] or [`CommitError::MissingSignatures`].
    pub fn verify_fully_signed(&self) -> Result<(), CommitError> {
        self.verify_signatures()?;
        let missing = self.missing_signers();
        if !missing.is_empty() {
            return Err(CommitError::MissingSignatures { missing });
        }
        Ok(())
    }
}
