//! Local signing primitive: turns this node's private key plus a settlement
//! or reset claim into the canonical Ed25519 signature the program checks
//! via instruction introspection.

use anyhow::{Context, Result};
use ed25519_dalek::{Signature, Signer as _, SigningKey};
use std::path::Path;

pub struct OracleSigner {
    key: SigningKey,
}

impl OracleSigner {
    /// Loads a 32-byte raw Ed25519 seed from `path`. The coordinator never
    /// generates keys itself; provisioning them is out of scope.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading oracle key at {}", path.display()))?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .context("oracle key file must contain exactly 32 bytes")?;
        Ok(Self { key: SigningKey::from_bytes(&seed) })
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    pub fn sign_settlement(&self, arena_id: &[u8; 32], winner: u8, nonce: u64) -> Signature {
        let message = soliseum_messages::settle_message(arena_id, winner, nonce);
        self.key.sign(&message)
    }

    pub fn sign_reset(&self, arena_id: &[u8; 32], nonce: u64) -> Signature {
        let message = soliseum_messages::reset_message(arena_id, nonce);
        self.key.sign(&message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::Verifier;

    fn signer() -> OracleSigner {
        OracleSigner { key: SigningKey::from_bytes(&[9u8; 32]) }
    }

    #[test]
    fn settlement_signature_verifies_against_own_public_key() {
        let signer = signer();
        let arena_id = [3u8; 32];
        let signature = signer.sign_settlement(&arena_id, 1, 7);
        let message = soliseum_messages::settle_message(&arena_id, 1, 7);
        assert!(signer.key.verifying_key().verify(&message, &signature).is_ok());
    }

    #[test]
    fn reset_signature_differs_from_settlement_signature() {
        let signer = signer();
        let arena_id = [4u8; 32];
        let settle_sig = signer.sign_settlement(&arena_id, 0, 2);
        let reset_sig = signer.sign_reset(&arena_id, 2);
        assert_ne!(settle_sig.to_bytes(), reset_sig.to_bytes());
    }
}
