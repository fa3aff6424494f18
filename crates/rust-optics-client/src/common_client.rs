use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionReceipt,
};
use rust_optics_common::{CommonState, DoubleUpdate, DoubleUpdateEvent, SignedUpdate};
use rust_optics_signers::{signers::alloy::Signer as TxSigner, Sign};
use url::Url;

use crate::{
    contracts_bindings::{TestCommon, TestCommon::TestCommonInstance},
    dispatch::report_tx,
    errors::{CommonClientError, ConversionError},
    utils::SecretUrl,
};

#[derive(Clone, Debug, serde::Deserialize)]
pub struct CommonClientConfig {
    pub eth_rpc_url: SecretUrl,
    pub contract_address: Address,
}

/// Typed access to a deployed `TestCommon` contract.
///
/// Views are plain `eth_call`s; state changing calls are dispatched through
/// [`report_tx`] and return the mined receipt.
#[derive(Debug, Clone)]
pub struct CommonClient<P = DynProvider> {
    contract: TestCommonInstance<P>,
}

impl CommonClient<DynProvider> {
    /// Read-only client over HTTP.
    pub fn new(config: &CommonClientConfig) -> Result<Self, ConversionError> {
        let url: Url = config.eth_rpc_url.clone().try_into()?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        Ok(Self::from_instance(TestCommon::new(
            config.contract_address,
            provider,
        )))
    }

    /// Client able to send transactions, signing them with `signer`.
    pub fn with_signer<S>(config: &CommonClientConfig, signer: S) -> Result<Self, ConversionError>
    where
        S: Sign + 'static,
    {
        let url: Url = config.eth_rpc_url.clone().try_into()?;
        let wallet = EthereumWallet::new(TxSigner::new(signer, None));
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();
        Ok(Self::from_instance(TestCommon::new(
            config.contract_address,
            provider,
        )))
    }
}

impl<P> CommonClient<P>
where
    P: Provider<Ethereum> + Clone,
{
    pub fn from_instance(contract: TestCommonInstance<P>) -> Self {
        Self { contract }
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    pub fn instance(&self) -> &TestCommonInstance<P> {
        &self.contract
    }

    pub async fn current(&self) -> Result<B256, CommonClientError> {
        Ok(self.contract.current().call().await?)
    }

    pub async fn home_domain_hash(&self) -> Result<B256, CommonClientError> {
        Ok(self.contract.homeDomainHash().call().await?)
    }

    pub async fn local_domain(&self) -> Result<u32, CommonClientError> {
        Ok(self.contract.localDomain().call().await?)
    }

    pub async fn queue_contains(&self, root: B256) -> Result<bool, CommonClientError> {
        Ok(self.contract.queueContains(root).call().await?)
    }

    pub async fn queue_end(&self) -> Result<B256, CommonClientError> {
        Ok(self.contract.queueEnd().call().await?)
    }

    pub async fn queue_length(&self) -> Result<U256, CommonClientError> {
        Ok(self.contract.queueLength().call().await?)
    }

    pub async fn state(&self) -> Result<CommonState, CommonClientError> {
        let raw = self.contract.state().call().await?;
        Ok(CommonState::try_from(u8::from(raw))?)
    }

    pub async fn updater(&self) -> Result<Address, CommonClientError> {
        Ok(self.contract.updater().call().await?)
    }

    /// Asks the contract whether the update carries its updater's signature.
    /// The contract checks against its own local domain, not the one in the update.
    pub async fn is_updater_signature(
        &self,
        signed_update: &SignedUpdate,
    ) -> Result<bool, CommonClientError> {
        Ok(self
            .contract
            .testIsUpdaterSignature(
                signed_update.update.previous_root,
                signed_update.update.new_root,
                signed_update.signature.clone(),
            )
            .call()
            .await?)
    }

    /// Submits a double update proof. Refuses to send when the contract has
    /// already failed, since the call would revert.
    #[tracing::instrument(skip(self, double), fields(contract = ?self.address(), previous_root = ?double.previous_root()), err)]
    pub async fn double_update(
        &self,
        double: &DoubleUpdate,
    ) -> Result<TransactionReceipt, CommonClientError> {
        if self.state().await? == CommonState::Failed {
            return Err(CommonClientError::FailedState);
        }

        let call = self.contract.doubleUpdate(
            double.previous_root(),
            double.new_roots(),
            double.0.signature.clone(),
            double.1.signature.clone(),
        );
        Ok(report_tx(self.address(), call).await?)
    }

    #[tracing::instrument(skip(self), fields(contract = ?self.address()), err)]
    pub async fn set_updater(&self, updater: Address) -> Result<TransactionReceipt, CommonClientError> {
        let call = self.contract.setUpdater(updater);
        Ok(report_tx(self.address(), call).await?)
    }

    pub async fn block_number(&self) -> Result<u64, CommonClientError> {
        Ok(self.contract.provider().get_block_number().await?)
    }

    /// `Update` events emitted in `[from_block, to_block]`.
    pub async fn updates(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<SignedUpdate>, CommonClientError> {
        let logs = self
            .contract
            .Update_filter()
            .from_block(from_block)
            .to_block(to_block)
            .query()
            .await?;
        Ok(logs
            .into_iter()
            .map(|(event, _log)| SignedUpdate::from(event))
            .collect())
    }

    /// `DoubleUpdate` events emitted in `[from_block, to_block]`.
    pub async fn double_updates(
        &self,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<DoubleUpdateEvent>, CommonClientError> {
        let logs = self
            .contract
            .DoubleUpdate_filter()
            .from_block(from_block)
            .to_block(to_block)
            .query()
            .await?;
        Ok(logs
            .into_iter()
            .map(|(event, _log)| DoubleUpdateEvent::from(event))
            .collect())
    }

    /// Raw calldata of a `doubleUpdate` call, for callers that relay it themselves.
    pub fn double_update_calldata(&self, double: &DoubleUpdate) -> Bytes {
        self.contract
            .doubleUpdate(
                double.previous_root(),
                double.new_roots(),
                double.0.signature.clone(),
                double.1.signature.clone(),
            )
            .calldata()
            .clone()
    }
}
