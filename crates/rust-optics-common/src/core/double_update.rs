use alloy_primitives::{Address, Bytes, B256};

use crate::{core::update::SignedUpdate, CommonError, SignatureError, Update};

/// Proof that an updater signed two different new roots on top of the same
/// previous root. Submitting it to `doubleUpdate` moves the contract into
/// the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DoubleUpdate(pub SignedUpdate, pub SignedUpdate);

impl DoubleUpdate {
    /// Pairs two signed updates, checking they actually conflict.
    pub fn new(first: SignedUpdate, second: SignedUpdate) -> Result<Self, CommonError> {
        let (a, b) = (&first.update, &second.update);
        if a.home_domain != b.home_domain {
            return Err(CommonError::DomainMismatch(a.home_domain, b.home_domain));
        }
        if a.previous_root != b.previous_root {
            return Err(CommonError::PreviousRootMismatch(
                a.previous_root,
                b.previous_root,
            ));
        }
        if a.new_root == b.new_root {
            return Err(CommonError::NotConflicting(a.new_root));
        }
        Ok(Self(first, second))
    }

    /// Rebuilds the proof from the arguments of a `doubleUpdate` call or a
    /// `DoubleUpdate` event. The home domain is not part of either and must
    /// be supplied by the caller.
    pub fn from_parts(
        home_domain: u32,
        previous_root: B256,
        new_roots: [B256; 2],
        signature: Bytes,
        signature2: Bytes,
    ) -> Result<Self, CommonError> {
        Self::new(
            SignedUpdate::new(
                Update::new(home_domain, previous_root, new_roots[0]),
                signature,
            ),
            SignedUpdate::new(
                Update::new(home_domain, previous_root, new_roots[1]),
                signature2,
            ),
        )
    }

    pub fn previous_root(&self) -> B256 {
        self.0.update.previous_root
    }

    pub fn new_roots(&self) -> [B256; 2] {
        [self.0.update.new_root, self.1.update.new_root]
    }

    /// Both halves must be signed by `updater` for the proof to be accepted on chain.
    pub fn verify(&self, updater: Address) -> Result<(), SignatureError> {
        self.0.verify(updater)?;
        self.1.verify(updater)
    }
}
