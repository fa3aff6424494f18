use alloy_primitives::{Address, Bytes, B256};

use crate::{
    core::{double_update::DoubleUpdate, queue::RootQueue, state::CommonState},
    utils::home_domain_hash,
    CommonError, SignatureError, SignedUpdate, Update,
};

/// Data carried by the `DoubleUpdate` event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DoubleUpdateEvent {
    pub old_root: B256,
    pub new_root: [B256; 2],
    pub signature: Bytes,
    pub signature2: Bytes,
}

impl From<&DoubleUpdate> for DoubleUpdateEvent {
    fn from(double: &DoubleUpdate) -> Self {
        Self {
            old_root: double.previous_root(),
            new_root: double.new_roots(),
            signature: double.0.signature.clone(),
            signature2: double.1.signature.clone(),
        }
    }
}

/// In-memory mirror of a deployed `TestCommon` contract.
///
/// It reproduces the contract's state machine so agents and tests can
/// predict the outcome of a call before paying for it.
#[derive(Debug, Clone)]
pub struct LocalCommon {
    local_domain: u32,
    updater: Address,
    state: CommonState,
    current: B256,
    queue: RootQueue,
}

impl LocalCommon {
    /// Equivalent of the constructor: stores the domain and updater and
    /// moves straight to `Active`.
    pub fn new(local_domain: u32, updater: Address) -> Self {
        Self {
            local_domain,
            updater,
            state: CommonState::Active,
            current: B256::ZERO,
            queue: RootQueue::new(),
        }
    }

    pub fn local_domain(&self) -> u32 {
        self.local_domain
    }

    pub fn updater(&self) -> Address {
        self.updater
    }

    pub fn state(&self) -> CommonState {
        self.state
    }

    pub fn current(&self) -> B256 {
        self.current
    }

    pub fn home_domain_hash(&self) -> B256 {
        home_domain_hash(self.local_domain)
    }

    pub fn queue(&self) -> &RootQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut RootQueue {
        &mut self.queue
    }

    pub fn queue_contains(&self, item: &B256) -> bool {
        self.queue.contains(item)
    }

    pub fn queue_end(&self) -> B256 {
        self.queue.end()
    }

    pub fn queue_length(&self) -> usize {
        self.queue.length()
    }

    pub fn set_updater(&mut self, updater: Address) {
        self.updater = updater;
    }

    /// `testIsUpdaterSignature`: whether `signature` is the current
    /// updater's signature over the update from `old_root` to `new_root`
    /// in this contract's own domain.
    ///
    /// A signature `ECDSA.recover` would revert on is an error, not `false`.
    pub fn is_updater_signature(
        &self,
        old_root: B256,
        new_root: B256,
        signature: &Bytes,
    ) -> Result<bool, SignatureError> {
        SignedUpdate::new(
            Update::new(self.local_domain, old_root, new_root),
            signature.clone(),
        )
        .is_signed_by(self.updater)
    }

    /// `doubleUpdate`: fails the contract when both signatures are from the
    /// updater and the new roots differ, returning the emitted event.
    ///
    /// Well formed signatures by someone else, or equal new roots, are a
    /// no-op. A malformed signature reverts with [`CommonError::Signature`].
    /// `signature2` is only inspected when `signature` is the updater's.
    pub fn double_update(
        &mut self,
        old_root: B256,
        new_root: [B256; 2],
        signature: &Bytes,
        signature2: &Bytes,
    ) -> Result<Option<DoubleUpdateEvent>, CommonError> {
        if self.state == CommonState::Failed {
            return Err(CommonError::FailedState);
        }

        if self.is_updater_signature(old_root, new_root[0], signature)?
            && self.is_updater_signature(old_root, new_root[1], signature2)?
            && new_root[0] != new_root[1]
        {
            self.state = CommonState::Failed;
            tracing::warn!(
                local_domain = self.local_domain,
                updater = %self.updater,
                old_root = %old_root,
                "Double update proven, contract failed"
            );
            return Ok(Some(DoubleUpdateEvent {
                old_root,
                new_root,
                signature: signature.clone(),
                signature2: signature2.clone(),
            }));
        }
        Ok(None)
    }

    /// Submits a [`DoubleUpdate`] proof.
    pub fn submit_double_update(
        &mut self,
        double: &DoubleUpdate,
    ) -> Result<Option<DoubleUpdateEvent>, CommonError> {
        self.double_update(
            double.previous_root(),
            double.new_roots(),
            &double.0.signature,
            &double.1.signature,
        )
    }
}
