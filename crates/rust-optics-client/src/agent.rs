use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::{
    common_client::{CommonClient, CommonClientConfig},
    errors::{AgentError, ConversionError, WatcherError},
    watcher::{UpdateWatcher, WatcherConfig},
};

/// An agent drives one task per replica, identified by name.
#[async_trait]
pub trait OpticsAgent: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Names of every replica this agent is configured for.
    fn replica_names(&self) -> Vec<String>;

    /// Runs the task for a single replica until it ends.
    async fn run(&self, replica: &str) -> Result<(), Self::Error>;

    /// Like [`OpticsAgent::run`], tagging any failure with the replica name.
    async fn run_report_error(&self, replica: &str) -> Result<(), AgentError> {
        self.run(replica).await.map_err(|err| AgentError::Failed {
            name: replica.to_owned(),
            source: Box::new(err),
        })
    }

    /// Runs the given replicas concurrently. Each one that ends is logged;
    /// once all of them have ended this returns [`AgentError::AllShutDown`].
    async fn run_many(self: Arc<Self>, replicas: &[String]) -> Result<(), AgentError> {
        let known = self.replica_names();
        if let Some(unknown) = replicas.iter().find(|name| !known.contains(*name)) {
            return Err(AgentError::UnknownReplica(unknown.clone()));
        }

        let mut tasks = JoinSet::new();
        for replica in replicas {
            let agent = Arc::clone(&self);
            let replica = replica.clone();
            tasks.spawn(async move {
                let result = agent.run_report_error(&replica).await;
                (replica, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((replica, Ok(()))) => {
                    tracing::info!(replica = %replica, "Replica shut down");
                }
                Ok((replica, Err(err))) => {
                    tracing::error!(replica = %replica, error = %err, "Replica shut down");
                }
                Err(join_err) => {
                    let err = AgentError::from(join_err);
                    tracing::error!(error = %err, "Replica shut down");
                }
            }
        }

        tracing::info!("All replicas have shut down");
        Err(AgentError::AllShutDown)
    }

    /// Runs every configured replica. See [`OpticsAgent::run_many`].
    async fn run_all(self: Arc<Self>) -> Result<(), AgentError> {
        let replicas = self.replica_names();
        self.run_many(&replicas).await
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AgentConfig {
    pub replicas: BTreeMap<String, CommonClientConfig>,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// Runs an [`UpdateWatcher`] for each configured replica.
#[derive(Clone, Debug)]
pub struct WatcherAgent {
    replicas: BTreeMap<String, CommonClient>,
    watcher: WatcherConfig,
}

impl WatcherAgent {
    pub fn new(watcher: WatcherConfig) -> Self {
        Self {
            replicas: BTreeMap::new(),
            watcher,
        }
    }

    /// Builds read-only clients for every configured replica. Use
    /// [`WatcherAgent::with_replica`] to add clients able to submit
    /// double updates.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ConversionError> {
        let mut agent = Self::new(config.watcher.clone());
        for (name, client_config) in &config.replicas {
            agent = agent.with_replica(name.clone(), CommonClient::new(client_config)?);
        }
        Ok(agent)
    }

    pub fn with_replica(mut self, name: impl Into<String>, client: CommonClient) -> Self {
        self.replicas.insert(name.into(), client);
        self
    }
}

#[async_trait]
impl OpticsAgent for WatcherAgent {
    type Error = WatcherError;

    fn replica_names(&self) -> Vec<String> {
        self.replicas.keys().cloned().collect()
    }

    async fn run(&self, replica: &str) -> Result<(), WatcherError> {
        let client = self.replicas.get(replica).cloned().ok_or_else(|| {
            WatcherError::InvalidConfig(format!("no client configured for replica {replica}"))
        })?;
        UpdateWatcher::new(client, self.watcher.clone())?.run().await
    }
}
