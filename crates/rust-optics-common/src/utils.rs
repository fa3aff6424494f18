use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// Suffix appended to the domain before hashing it into the home domain hash.
pub const HOME_DOMAIN_SUFFIX: &[u8] = b"OPTICS";

const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak256 over the concatenation of `parts`.
pub fn keccak256_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    B256::from(output)
}

/// `keccak256(abi.encodePacked(domain, "OPTICS"))`
pub fn home_domain_hash(domain: u32) -> B256 {
    keccak256_concat(&[&domain.to_be_bytes(), HOME_DOMAIN_SUFFIX])
}

/// EIP-191 personal message hash of a 32-byte digest, as produced by
/// `ECDSA.toEthSignedMessageHash`.
pub fn to_eth_signed_message_hash(digest: B256) -> B256 {
    keccak256_concat(&[ETH_SIGNED_MESSAGE_PREFIX, digest.as_slice()])
}
