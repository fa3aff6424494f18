use std::{
    collections::{HashMap, VecDeque},
    time::Duration,
};

use alloy::{
    network::Ethereum,
    primitives::{Address, B256},
    providers::{DynProvider, Provider},
};
use rust_optics_common::{CommonState, DoubleUpdate, SignedUpdate};

use crate::{
    common_client::CommonClient,
    errors::{CommonClientError, WatcherError},
};

fn default_polling_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_chunk_size() -> u64 {
    1000
}

fn default_history_limit() -> usize {
    100_000
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct WatcherConfig {
    #[serde(default = "default_polling_interval")]
    pub polling_interval: Duration,
    #[serde(default)]
    pub from_block: u64,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u64,
    #[serde(default)]
    pub submit_double_updates: bool,
    /// Most previous roots remembered at once. See [`UpdateHistory::with_limit`].
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            polling_interval: default_polling_interval(),
            from_block: 0,
            chunk_size: default_chunk_size(),
            submit_double_updates: false,
            history_limit: default_history_limit(),
        }
    }
}

/// Signed updates seen so far, keyed by the root they build on.
///
/// Only updates signed by the current updater are kept. The first update seen
/// for a root stays; a later one with a different new root is a conflict.
///
/// Holds at most `limit` roots. Past that the oldest root is forgotten and a
/// conflict on it goes unnoticed.
#[derive(Debug, Clone)]
pub struct UpdateHistory {
    by_previous_root: HashMap<B256, SignedUpdate>,
    insertion_order: VecDeque<B256>,
    limit: usize,
}

impl Default for UpdateHistory {
    fn default() -> Self {
        Self::with_limit(default_history_limit())
    }
}

impl UpdateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History remembering at most `limit` previous roots, at least one.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            by_previous_root: HashMap::new(),
            insertion_order: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.by_previous_root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_previous_root.is_empty()
    }

    pub fn get(&self, previous_root: &B256) -> Option<&SignedUpdate> {
        self.by_previous_root.get(previous_root)
    }

    /// Records `signed` and returns the proof if it conflicts with an update
    /// already seen on the same previous root.
    pub fn observe(&mut self, updater: Address, signed: SignedUpdate) -> Option<DoubleUpdate> {
        if let Err(err) = signed.verify(updater) {
            tracing::warn!(
                previous_root = ?signed.update.previous_root,
                new_root = ?signed.update.new_root,
                error = %err,
                "Ignoring update not signed by the updater"
            );
            return None;
        }

        let Some(existing) = self.by_previous_root.get(&signed.update.previous_root) else {
            self.remember(signed);
            return None;
        };

        if existing.update.new_root == signed.update.new_root {
            return None;
        }

        match DoubleUpdate::new(existing.clone(), signed) {
            Ok(double) => Some(double),
            Err(err) => {
                tracing::warn!(error = %err, "Updates on the same root do not form a double update");
                None
            }
        }
    }

    fn remember(&mut self, signed: SignedUpdate) {
        if self.insertion_order.len() >= self.limit {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.by_previous_root.remove(&oldest);
                tracing::debug!(previous_root = ?oldest, "Forgetting oldest update");
            }
        }
        self.insertion_order.push_back(signed.update.previous_root);
        self.by_previous_root
            .insert(signed.update.previous_root, signed);
    }
}

/// Watches a `TestCommon` contract for conflicting updates signed by its
/// updater.
#[derive(Debug)]
pub struct UpdateWatcher<P = DynProvider> {
    client: CommonClient<P>,
    config: WatcherConfig,
    history: UpdateHistory,
    next_block: u64,
}

impl<P> UpdateWatcher<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn new(client: CommonClient<P>, config: WatcherConfig) -> Result<Self, WatcherError> {
        if config.chunk_size == 0 {
            return Err(WatcherError::InvalidConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if config.history_limit == 0 {
            return Err(WatcherError::InvalidConfig(
                "history_limit must be greater than zero".to_string(),
            ));
        }
        let next_block = config.from_block;
        let history = UpdateHistory::with_limit(config.history_limit);
        Ok(Self {
            client,
            config,
            history,
            next_block,
        })
    }

    pub fn client(&self) -> &CommonClient<P> {
        &self.client
    }

    pub fn history(&self) -> &UpdateHistory {
        &self.history
    }

    /// First block the next poll will scan.
    pub fn next_block(&self) -> u64 {
        self.next_block
    }

    /// Polls until the contract reaches the `Failed` state.
    ///
    /// A detected double update is submitted when `submit_double_updates` is
    /// set; otherwise it ends the watcher with
    /// [`WatcherError::DoubleUpdateDetected`].
    #[tracing::instrument(skip(self), fields(contract = ?self.client.address()), err)]
    pub async fn run(&mut self) -> Result<(), WatcherError> {
        loop {
            if self.client.state().await? == CommonState::Failed {
                tracing::info!("Contract is in failed state, stopping watcher");
                return Ok(());
            }

            if let Some(double) = self.poll().await? {
                self.handle_double_update(double).await?;
                continue;
            }

            tokio::time::sleep(self.config.polling_interval).await;
        }
    }

    /// Scans every block from the last scanned one up to the current head, in
    /// chunks of `chunk_size` blocks. Returns the first conflict found.
    pub async fn poll(&mut self) -> Result<Option<DoubleUpdate>, WatcherError> {
        let head = self.client.block_number().await?;
        let updater = self.client.updater().await?;
        let mut detected = None;

        while self.next_block <= head {
            let from = self.next_block;
            let to = from
                .saturating_add(self.config.chunk_size - 1)
                .min(head);

            let updates = self.client.updates(from, to).await?;
            tracing::debug!(from, to, count = updates.len(), "Fetched update logs");

            for signed in updates {
                if let Some(double) = self.history.observe(updater, signed) {
                    detected.get_or_insert(double);
                }
            }
            self.next_block = to + 1;

            if detected.is_some() {
                break;
            }
        }

        Ok(detected)
    }

    async fn handle_double_update(&self, double: DoubleUpdate) -> Result<(), WatcherError> {
        let previous_root = double.previous_root();
        tracing::error!(
            previous_root = ?previous_root,
            new_roots = ?double.new_roots(),
            "Double update detected"
        );

        if !self.config.submit_double_updates {
            return Err(WatcherError::DoubleUpdateDetected(previous_root));
        }

        match self.client.double_update(&double).await {
            Ok(receipt) => {
                tracing::info!(
                    tx_hash = ?receipt.transaction_hash,
                    "Submitted double update"
                );
                Ok(())
            }
            Err(CommonClientError::FailedState) => {
                tracing::info!("Contract already failed, double update not submitted");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_optics_common::Update;
    use rust_optics_signers::{signers::private_key::Signer as PrivateKeySigner, Sign};

    use super::*;

    const DOMAIN: u32 = 1000;

    async fn signed(signer: &PrivateKeySigner, old: u8, new: u8) -> SignedUpdate {
        Update::new(DOMAIN, B256::repeat_byte(old), B256::repeat_byte(new))
            .sign_with(signer)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn conflicting_updates_produce_a_double_update() {
        let signer = PrivateKeySigner::random();
        let updater = signer.public_key().address();
        let mut history = UpdateHistory::new();

        assert!(history.observe(updater, signed(&signer, 1, 2).await).is_none());
        let double = history
            .observe(updater, signed(&signer, 1, 3).await)
            .unwrap();

        assert_eq!(double.previous_root(), B256::repeat_byte(1));
        assert_eq!(
            double.new_roots(),
            [B256::repeat_byte(2), B256::repeat_byte(3)]
        );
        assert!(double.verify(updater).is_ok());
    }

    #[tokio::test]
    async fn duplicate_logs_are_idempotent() {
        let signer = PrivateKeySigner::random();
        let updater = signer.public_key().address();
        let mut history = UpdateHistory::new();
        let update = signed(&signer, 1, 2).await;

        assert!(history.observe(updater, update.clone()).is_none());
        assert!(history.observe(updater, update.clone()).is_none());
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&B256::repeat_byte(1)), Some(&update));
    }

    #[tokio::test]
    async fn updates_chaining_on_different_roots_do_not_conflict() {
        let signer = PrivateKeySigner::random();
        let updater = signer.public_key().address();
        let mut history = UpdateHistory::new();

        assert!(history.observe(updater, signed(&signer, 1, 2).await).is_none());
        assert!(history.observe(updater, signed(&signer, 2, 3).await).is_none());
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn updates_from_other_signers_are_ignored() {
        let updater = PrivateKeySigner::random();
        let intruder = PrivateKeySigner::random();
        let updater_address = updater.public_key().address();
        let mut history = UpdateHistory::new();

        assert!(history
            .observe(updater_address, signed(&updater, 1, 2).await)
            .is_none());
        assert!(history
            .observe(updater_address, signed(&intruder, 1, 3).await)
            .is_none());
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn oldest_root_is_forgotten_past_the_limit() {
        let signer = PrivateKeySigner::random();
        let updater = signer.public_key().address();
        let mut history = UpdateHistory::with_limit(2);

        assert!(history.observe(updater, signed(&signer, 1, 2).await).is_none());
        assert!(history.observe(updater, signed(&signer, 2, 3).await).is_none());
        assert!(history.observe(updater, signed(&signer, 3, 4).await).is_none());

        assert_eq!(history.len(), 2);
        assert!(history.get(&B256::repeat_byte(1)).is_none());
        assert!(history.get(&B256::repeat_byte(3)).is_some());

        // Root 1 was forgotten, so a conflicting update on it is new again.
        assert!(history.observe(updater, signed(&signer, 1, 5).await).is_none());
        // Root 3 is still remembered.
        assert!(history.observe(updater, signed(&signer, 3, 6).await).is_some());
    }

    #[test]
    fn config_defaults_apply() {
        let config: WatcherConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.polling_interval, Duration::from_secs(5));
        assert_eq!(config.from_block, 0);
        assert_eq!(config.chunk_size, 1000);
        assert!(!config.submit_double_updates);
        assert_eq!(config.history_limit, 100_000);

        let config: WatcherConfig = serde_json::from_str(
            r#"{"polling_interval": {"secs": 1, "nanos": 0}, "from_block": 12, "submit_double_updates": true}"#,
        )
        .unwrap();
        assert_eq!(config.polling_interval, Duration::from_secs(1));
        assert_eq!(config.from_block, 12);
        assert!(config.submit_double_updates);
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let client = CommonClient::new(&crate::common_client::CommonClientConfig {
            eth_rpc_url: crate::utils::SecretUrl::new("http://localhost:8545".parse().unwrap()),
            contract_address: Address::ZERO,
        })
        .unwrap();
        let config = WatcherConfig {
            chunk_size: 0,
            ..Default::default()
        };

        assert!(matches!(
            UpdateWatcher::new(client.clone(), config),
            Err(WatcherError::InvalidConfig(_))
        ));
        assert!(matches!(
            UpdateWatcher::new(
                client.clone(),
                WatcherConfig {
                    history_limit: 0,
                    ..Default::default()
                }
            ),
            Err(WatcherError::InvalidConfig(_))
        ));

        let watcher = UpdateWatcher::new(
            client,
            WatcherConfig {
                from_block: 7,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(watcher.next_block(), 7);
        assert!(watcher.history().is_empty());
        assert_eq!(watcher.history().limit(), 100_000);
    }
}
