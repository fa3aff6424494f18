use alloy_primitives::{Address, B256};

/// Errors returned by this crate
#[derive(Debug, thiserror::Error)]
pub enum OpticsError {
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Errors raised while checking an updater signature.
///
/// The checks mirror the ones `ECDSA.recover` performs around `ecrecover`.
/// Each of them is a revert on chain, not a `false` answer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Invalid signature 'v' value: {0}")]
    InvalidV(u8),
    #[error("Invalid signature 's' value: not in the lower half order")]
    InvalidS,
    #[error("Failed to recover signer: {0}")]
    Recovery(#[from] secp256k1::Error),
    #[error("Signature recovered to {recovered}, expected updater {expected}")]
    NotUpdater { expected: Address, recovered: Address },
}

/// Errors raised while producing an updater signature.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid digest: {0}")]
    Digest(#[from] secp256k1::Error),
    #[error("Failed to sign update")]
    Signer(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Errors specific to conversion
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Failed to parse Common state: {0}")]
    InvalidState(u8),
}

/// Errors specific to the root queue
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is empty")]
    Empty,
}

/// Errors produced by the Common state machine and double update proofs
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommonError {
    #[error("failed state")]
    FailedState,
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error("Updates belong to different home domains: {0} and {1}")]
    DomainMismatch(u32, u32),
    #[error("Updates build on different previous roots: {0} and {1}")]
    PreviousRootMismatch(B256, B256),
    #[error("Updates commit to the same new root {0}")]
    NotConflicting(B256),
}
