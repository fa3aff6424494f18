//! Signers used by Optics agents to produce updater signatures.
//!
//! The [`Sign`] trait is the seam between agents and key material: the
//! in-memory [`signers::private_key::Signer`] is provided, remote signers
//! (HSM, KMS) only need to implement [`Sign`] to be usable everywhere,
//! including as an alloy transaction signer through
//! [`signers::alloy::Signer`].

pub mod signature;
pub mod signers;

pub use secp256k1;
pub use secp256k1::Message;
pub use signature::RecoverableSignature;

use alloy_primitives::Address;
use tiny_keccak::{Hasher, Keccak};

/// Errors shared by the bundled signers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(#[from] secp256k1::Error),
    #[error("Invalid hex encoding: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A secp256k1 public key together with its Ethereum address derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(secp256k1::PublicKey);

impl PublicKey {
    pub fn new(key: secp256k1::PublicKey) -> Self {
        Self(key)
    }

    /// Ethereum address of this key: the last 20 bytes of the keccak256 hash
    /// of the uncompressed key without its `0x04` prefix.
    pub fn address(&self) -> Address {
        let uncompressed = self.0.serialize_uncompressed();
        let hash = keccak256(&uncompressed[1..]);
        Address::from_slice(&hash[12..])
    }

    pub fn inner(&self) -> &secp256k1::PublicKey {
        &self.0
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(key: secp256k1::PublicKey) -> Self {
        Self(key)
    }
}

/// Anything able to produce recoverable secp256k1 signatures over a 32-byte digest.
#[async_trait::async_trait]
pub trait Sign: Send + Sync + std::fmt::Debug {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs the digest as is. No prefix is applied.
    async fn sign_digest(&self, message: &Message) -> Result<RecoverableSignature, Self::Error>;

    /// Public key matching the signatures produced by [`Sign::sign_digest`].
    fn public_key(&self) -> PublicKey;
}

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::signers::private_key::Signer;

    #[test]
    fn address_matches_known_vector() {
        // Well known development key #0 used by anvil and hardhat.
        let signer = Signer::from_str(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        let expected = Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(signer.public_key().address(), expected);
    }

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
