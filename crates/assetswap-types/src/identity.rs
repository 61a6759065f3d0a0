//! Signing identities.
//!
//! An [`Identity`] is a [`Party`] plus the ed25519 signing key behind its
//! [`PartyKey`]. It is the only way to produce a signature for that party.

use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::{Party, PartyKey, PartySignature, Transaction};

/// A party together with its private signing key.
pub struct Identity {
    party: Party,
    signing_key: SigningKey,
}

impl Identity {
    /// Build an identity from a 32-byte ed25519 secret.
    #[must_use]
    pub fn from_secret(name: impl Into<String>, secret: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&secret);
        let key = PartyKey(signing_key.verifying_key().to_bytes());
        Self {
            party: Party::new(name, key),
            signing_key,
        }
    }

    #[must_use]
    pub fn party(&self) -> &Party {
        &self.party
    }

    #[must_use]
    pub fn key(&self) -> PartyKey {
        self.party.key
    }

    /// Sign arbitrary bytes.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.signing_key.sign(message).to_bytes().to_vec()
    }

    /// Sign a transaction's id.
    #[must_use]
    pub fn sign_transaction(&self, tx: &Transaction) -> PartySignature {
        PartySignature {
            by: self.key(),
            bytes: self.sign(tx.id().as_bytes()),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("party", &self.party)
            .finish_non_exhaustive()
    }
}

/// Check an ed25519 signature made by `key` over `message`.
#[must_use]
pub fn verify_signature(key: &PartyKey, message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(key.as_bytes()) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &signature).is_ok()
}

/// Random identities for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Identity {
    pub fn random(name: impl Into<String>) -> Self {
        Self::from_secret(name, rand::random::<[u8; 32]>())
    }
}
