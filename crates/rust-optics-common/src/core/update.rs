use alloy_primitives::{b256, Address, Bytes, B256};
use rust_optics_signers::{signature::SIGNATURE_LENGTH, PublicKey, RecoverableSignature, Sign};
use secp256k1::{Message, SECP256K1};

use crate::{
    utils::{home_domain_hash, keccak256_concat, to_eth_signed_message_hash},
    SignatureError, SigningError,
};

/// Half of the secp256k1 curve order. Signatures with a larger `s` are
/// malleable and rejected by `ECDSA.recover`.
const SECP256K1N_HALF: B256 =
    b256!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// A state root transition attested by the updater of `home_domain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Update {
    pub home_domain: u32,
    pub previous_root: B256,
    pub new_root: B256,
}

impl Update {
    pub fn new(home_domain: u32, previous_root: B256, new_root: B256) -> Self {
        Self {
            home_domain,
            previous_root,
            new_root,
        }
    }

    /// `keccak256(abi.encodePacked(homeDomainHash, oldRoot, newRoot))`
    pub fn signing_hash(&self) -> B256 {
        keccak256_concat(&[
            home_domain_hash(self.home_domain).as_slice(),
            self.previous_root.as_slice(),
            self.new_root.as_slice(),
        ])
    }

    /// The digest the updater actually signs: the signing hash behind the
    /// EIP-191 personal message prefix.
    pub fn prepended_hash(&self) -> B256 {
        to_eth_signed_message_hash(self.signing_hash())
    }

    /// Signs the update, producing the 65-byte signature the contract expects.
    pub async fn sign_with<S: Sign>(self, signer: &S) -> Result<SignedUpdate, SigningError> {
        let message = Message::from_slice(self.prepended_hash().as_slice())?;
        let signature = signer
            .sign_digest(&message)
            .await
            .map_err(|e| SigningError::Signer(Box::new(e)))?;

        tracing::debug!(
            home_domain = self.home_domain,
            previous_root = %self.previous_root,
            new_root = %self.new_root,
            "Signed update"
        );

        Ok(SignedUpdate {
            update: self,
            signature: Bytes::copy_from_slice(&signature.to_eth_bytes()),
        })
    }
}

/// An [`Update`] together with the raw signature bytes published on chain.
///
/// The signature is kept as raw bytes because it is taken verbatim from
/// event logs and may be malformed; [`SignedUpdate::recover`] validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SignedUpdate {
    pub update: Update,
    pub signature: Bytes,
}

impl SignedUpdate {
    pub fn new(update: Update, signature: Bytes) -> Self {
        Self { update, signature }
    }

    /// Recovers the address that signed this update, applying the same
    /// validity checks as OpenZeppelin's `ECDSA.recover` (length, then `s`,
    /// then `v`).
    pub fn recover(&self) -> Result<Address, SignatureError> {
        let signature = self.signature.as_ref();
        if signature.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(signature.len()));
        }
        if signature[32..64] > SECP256K1N_HALF[..] {
            return Err(SignatureError::InvalidS);
        }
        let v = signature[64];
        if v != 27 && v != 28 {
            return Err(SignatureError::InvalidV(v));
        }

        let recoverable = RecoverableSignature::from_eth_bytes(signature)?;
        let message = Message::from_slice(self.update.prepended_hash().as_slice())?;
        let public_key = SECP256K1.recover_ecdsa(&message, &recoverable)?;
        Ok(PublicKey::from(public_key).address())
    }

    /// Succeeds if and only if the signature recovers to `updater`.
    pub fn verify(&self, updater: Address) -> Result<(), SignatureError> {
        let recovered = self.recover()?;
        if recovered != updater {
            return Err(SignatureError::NotUpdater {
                expected: updater,
                recovered,
            });
        }
        Ok(())
    }

    /// `testIsUpdaterSignature` semantics: `Ok(false)` only for a well formed
    /// signature by someone else. Malformed or unrecoverable signatures are
    /// errors, as the contract reverts on them.
    pub fn is_signed_by(&self, updater: Address) -> Result<bool, SignatureError> {
        Ok(self.recover()? == updater)
    }
}
