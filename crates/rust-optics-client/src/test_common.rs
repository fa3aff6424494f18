//! Factory for the `TestCommon` contract: deploy it, build its deploy
//! transaction, or bind to an existing instance.
//!
//! Every operation delegates to the `sol!` generated binding in
//! [`crate::contracts_bindings`]; this module only fixes the ABI and
//! bytecode and keeps the provider around.

use std::{marker::PhantomData, sync::LazyLock};

use alloy::{
    contract::Interface,
    json_abi::JsonAbi,
    network::{Ethereum, Network},
    primitives::{Address, Bytes},
    providers::Provider,
};

use crate::{
    contracts_bindings::TestCommon::{self, TestCommonInstance},
    errors::ChainCommunicationError,
};

/// The compiler artifact the binding is generated from.
pub const ARTIFACT: &str = include_str!("generated/abi/TestCommon.json");

#[derive(serde::Deserialize)]
struct Artifact {
    abi: JsonAbi,
}

static TEST_COMMON_ABI: LazyLock<JsonAbi> = LazyLock::new(|| {
    // The same file is parsed by `sol!` at compile time, so this cannot fail.
    serde_json::from_str::<Artifact>(ARTIFACT)
        .expect("TestCommon artifact is valid")
        .abi
});

/// The parsed JSON ABI of the contract.
pub fn abi() -> &'static JsonAbi {
    &TEST_COMMON_ABI
}

/// Creation bytecode of the contract.
pub fn bytecode() -> &'static Bytes {
    &TestCommon::BYTECODE
}

/// A dynamic interface over the ABI, for selector lookups and untyped
/// encoding/decoding.
pub fn create_interface() -> Interface {
    Interface::new(abi().clone())
}

/// Binds to an already deployed instance without going through a factory.
pub fn connect_at<P, N>(address: Address, provider: P) -> TestCommonInstance<P, N>
where
    P: Provider<N>,
    N: Network,
{
    TestCommon::new(address, provider)
}

/// Deploys and binds `TestCommon` instances through a provider. The provider
/// needs a wallet to deploy; read-only providers can still attach.
#[derive(Debug, Clone)]
pub struct TestCommonFactory<P, N = Ethereum> {
    provider: P,
    _network: PhantomData<N>,
}

impl<P, N> TestCommonFactory<P, N>
where
    P: Provider<N> + Clone,
    N: Network,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            _network: PhantomData,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Deploys a new instance and waits for it to be mined.
    #[tracing::instrument(skip(self), err)]
    pub async fn deploy(
        &self,
        local_domain: u32,
        updater: Address,
    ) -> Result<TestCommonInstance<P, N>, ChainCommunicationError> {
        let address = TestCommon::deploy_builder(self.provider.clone(), local_domain, updater)
            .deploy()
            .await?;

        tracing::info!(address = ?address, local_domain, updater = ?updater, "Deployed TestCommon");
        Ok(self.attach(address))
    }

    /// Builds the deploy transaction without sending it: no recipient, and
    /// the bytecode followed by the ABI encoded constructor arguments as input.
    pub fn deploy_transaction(&self, local_domain: u32, updater: Address) -> N::TransactionRequest {
        TestCommon::deploy_builder(self.provider.clone(), local_domain, updater)
            .into_transaction_request()
    }

    /// Binds to the instance at `address` using this factory's provider.
    pub fn attach(&self, address: Address) -> TestCommonInstance<P, N> {
        TestCommon::new(address, self.provider.clone())
    }

    /// A factory that deploys and attaches through `provider` instead.
    pub fn connect<Q>(&self, provider: Q) -> TestCommonFactory<Q, N>
    where
        Q: Provider<N> + Clone,
    {
        TestCommonFactory::new(provider)
    }
}
