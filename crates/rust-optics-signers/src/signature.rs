use crate::secp256k1;
use std::convert::AsRef;
use std::ops::Deref;

/// Offset Ethereum adds to the recovery id in `v` (`ECDSA.recover` expects 27 or 28).
pub const ETH_V_OFFSET: u8 = 27;

/// Length in bytes of a serialized `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverableSignature(pub secp256k1::ecdsa::RecoverableSignature);

impl From<secp256k1::ecdsa::RecoverableSignature> for RecoverableSignature {
    fn from(sig: secp256k1::ecdsa::RecoverableSignature) -> Self {
        RecoverableSignature(sig)
    }
}

impl Deref for RecoverableSignature {
    type Target = secp256k1::ecdsa::RecoverableSignature;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<secp256k1::ecdsa::RecoverableSignature> for RecoverableSignature {
    fn as_ref(&self) -> &secp256k1::ecdsa::RecoverableSignature {
        &self.0
    }
}

impl RecoverableSignature {
    /// Encodes the signature as `[R || S || V]`, where V is the raw recovery id (0 or 1).
    pub fn encode_as_rsv(&self) -> [u8; SIGNATURE_LENGTH] {
        let (recovery_id, sig) = self.0.serialize_compact();

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature[..64].copy_from_slice(&sig);
        signature[64] = recovery_id.to_i32() as u8;
        signature
    }

    /// Encodes the signature the way Solidity's `ECDSA.recover` consumes it:
    /// `[R || S || V]` with V in {27, 28}.
    pub fn to_eth_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut signature = self.encode_as_rsv();
        signature[64] += ETH_V_OFFSET;
        signature
    }

    /// Parses an `[R || S || V]` signature where V is either a raw recovery
    /// id or carries the Ethereum offset.
    pub fn from_eth_bytes(bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(secp256k1::Error::InvalidSignature);
        }
        let v = match bytes[64] {
            v @ 0..=1 => v,
            v @ 27..=28 => v - ETH_V_OFFSET,
            _ => return Err(secp256k1::Error::InvalidRecoveryId),
        };
        let recovery_id = secp256k1::ecdsa::RecoveryId::from_i32(v as i32)?;
        let sig = secp256k1::ecdsa::RecoverableSignature::from_compact(&bytes[..64], recovery_id)?;
        Ok(RecoverableSignature(sig))
    }

    /// Returns the R component of the signature as a 32-byte array.
    pub fn r(&self) -> [u8; 32] {
        let rsv = self.encode_as_rsv();
        let mut r = [0u8; 32];
        r.copy_from_slice(&rsv[..32]);
        r
    }

    /// Returns the S component of the signature as a 32-byte array.
    pub fn s(&self) -> [u8; 32] {
        let rsv = self.encode_as_rsv();
        let mut s = [0u8; 32];
        s.copy_from_slice(&rsv[32..64]);
        s
    }

    /// Returns the recovery identifier (V) as a `u8` (0 or 1).
    pub fn v(&self) -> u8 {
        self.encode_as_rsv()[64]
    }
}
