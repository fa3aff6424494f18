#[cfg(feature = "alloy-signer")]
pub mod alloy;
#[cfg(feature = "private-key-signer")]
pub mod private_key;
