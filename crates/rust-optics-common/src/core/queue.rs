use std::collections::VecDeque;

use alloy_primitives::B256;

use crate::QueueError;

/// FIFO of roots with the semantics of the on-chain `QueueLib.Queue`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootQueue {
    items: VecDeque<B256>,
}

impl RootQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, item: B256) {
        self.items.push_back(item);
    }

    pub fn dequeue(&mut self) -> Result<B256, QueueError> {
        self.items.pop_front().ok_or(QueueError::Empty)
    }

    pub fn peek(&self) -> Result<B256, QueueError> {
        self.items.front().copied().ok_or(QueueError::Empty)
    }

    pub fn contains(&self, item: &B256) -> bool {
        self.items.contains(item)
    }

    pub fn length(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Most recently enqueued root, or zero when the queue is empty (the
    /// contract reads a cleared storage slot in that case).
    pub fn end(&self) -> B256 {
        self.items.back().copied().unwrap_or(B256::ZERO)
    }
}

impl Extend<B256> for RootQueue {
    fn extend<T: IntoIterator<Item = B256>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}
