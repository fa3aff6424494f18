use alloy::primitives::TxHash;

/// Errors returned by the client.
#[derive(Debug, thiserror::Error)]
pub enum OpticsClientError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    ChainCommunication(#[from] ChainCommunicationError),
    #[error(transparent)]
    CommonClient(#[from] Box<CommonClientError>),
    #[error(transparent)]
    Watcher(#[from] Box<WatcherError>),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// Errors specific to conversion
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
    #[error(transparent)]
    OpticsCommon(#[from] rust_optics_common::ConversionError),
}

/// Errors raised while talking to the chain through alloy.
#[derive(Debug, thiserror::Error)]
pub enum ChainCommunicationError {
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    #[error(transparent)]
    Transport(#[from] alloy::transports::TransportError),
    #[error("Transaction dropped from mempool: {0}")]
    DroppedError(TxHash),
    #[error("Waiting for dispatched tx confirmation timed out! Tx_hash: {0}.")]
    DispatchTimeout(TxHash),
    #[error("Transaction reverted: {0}")]
    Reverted(TxHash),
}

impl From<ChainCommunicationError> for CommonClientError {
    fn from(err: ChainCommunicationError) -> Self {
        CommonClientError::ChainCommunication(Box::new(err))
    }
}

impl From<alloy::contract::Error> for CommonClientError {
    fn from(err: alloy::contract::Error) -> Self {
        ChainCommunicationError::from(err).into()
    }
}

impl From<alloy::transports::TransportError> for CommonClientError {
    fn from(err: alloy::transports::TransportError) -> Self {
        ChainCommunicationError::from(err).into()
    }
}

/// Errors specific to the [`CommonClient`](crate::common_client::CommonClient).
#[derive(Debug, thiserror::Error)]
pub enum CommonClientError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    ChainCommunication(Box<ChainCommunicationError>),
    #[error(transparent)]
    Signature(#[from] rust_optics_common::SignatureError),
    #[error(transparent)]
    Common(#[from] rust_optics_common::CommonError),
    #[error("Contract is in failed state, refusing to submit")]
    FailedState,
}

impl From<rust_optics_common::ConversionError> for CommonClientError {
    fn from(err: rust_optics_common::ConversionError) -> Self {
        CommonClientError::Conversion(ConversionError::OpticsCommon(err))
    }
}

impl From<CommonClientError> for OpticsClientError {
    fn from(err: CommonClientError) -> Self {
        OpticsClientError::CommonClient(Box::new(err))
    }
}

/// Errors specific to the [`UpdateWatcher`](crate::watcher::UpdateWatcher).
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    #[error(transparent)]
    Client(#[from] CommonClientError),
    #[error("Invalid watcher config: {0}")]
    InvalidConfig(String),
    #[error("Double update detected on previous root {0}")]
    DoubleUpdateDetected(alloy::primitives::B256),
}

impl From<WatcherError> for OpticsClientError {
    fn from(err: WatcherError) -> Self {
        OpticsClientError::Watcher(Box::new(err))
    }
}

/// Errors specific to agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Replica named {name} failed")]
    Failed {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("No replica named {0}")]
    UnknownReplica(String),
    #[error("Agent task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("All replicas have shut down")]
    AllShutDown,
}
