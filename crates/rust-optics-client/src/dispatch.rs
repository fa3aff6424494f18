use std::{future::Future, time::Duration};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Network, ReceiptResponse},
    primitives::{Address, TxHash},
    providers::Provider,
};

use crate::errors::ChainCommunicationError;

/// How long to wait for a dispatched transaction to be mined (15 minutes).
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(900);

/// Dispatches a contract call, logs the tx hash, waits for its receipt and
/// returns it. See [`report_tx_with_timeout`].
pub async fn report_tx<P, D, N>(
    to: Address,
    call: CallBuilder<P, D, N>,
) -> Result<N::ReceiptResponse, ChainCommunicationError>
where
    P: Provider<N>,
    D: CallDecoder,
    N: Network,
{
    report_tx_with_timeout(to, call, CONFIRMATION_TIMEOUT).await
}

/// Same as [`report_tx`] with an explicit confirmation timeout.
///
/// A transaction the node no longer knows about while it has no receipt is
/// reported as [`ChainCommunicationError::DroppedError`], a mined but failed
/// one as [`ChainCommunicationError::Reverted`].
pub async fn report_tx_with_timeout<P, D, N>(
    to: Address,
    call: CallBuilder<P, D, N>,
    confirmation_timeout: Duration,
) -> Result<N::ReceiptResponse, ChainCommunicationError>
where
    P: Provider<N>,
    D: CallDecoder,
    N: Network,
{
    let data = format!("0x{}", hex::encode(call.calldata()));

    tracing::info!(to = ?to, data = %data, "Dispatching transaction");
    let pending = call.send().await?;
    let tx_hash = *pending.tx_hash();

    tracing::info!(
        to = ?to,
        data = %data,
        tx_hash = ?tx_hash,
        "Dispatched tx with tx_hash {:?}",
        tx_hash
    );

    let provider = pending.provider();
    let poll_interval = provider.client().poll_interval();
    confirm(
        tx_hash,
        confirmation_timeout,
        wait_for_receipt(provider, tx_hash, poll_interval),
    )
    .await
}

/// Polls for the receipt of `tx_hash` until it shows up or the node drops
/// the transaction.
async fn wait_for_receipt<P, N>(
    provider: &P,
    tx_hash: TxHash,
    poll_interval: Duration,
) -> Result<N::ReceiptResponse, ChainCommunicationError>
where
    P: Provider<N>,
    N: Network,
{
    loop {
        if let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? {
            return Ok(receipt);
        }
        if provider.get_transaction_by_hash(tx_hash).await?.is_none() {
            return Err(ChainCommunicationError::DroppedError(tx_hash));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

async fn confirm<R, F>(
    tx_hash: TxHash,
    confirmation_timeout: Duration,
    receipt: F,
) -> Result<R, ChainCommunicationError>
where
    R: ReceiptResponse,
    F: Future<Output = Result<R, ChainCommunicationError>>,
{
    let receipt = tokio::time::timeout(confirmation_timeout, receipt)
        .await
        .map_err(|_| ChainCommunicationError::DispatchTimeout(tx_hash))??;

    if !receipt.status() {
        tracing::warn!(tx_hash = ?tx_hash, "Transaction reverted");
        return Err(ChainCommunicationError::Reverted(tx_hash));
    }

    tracing::info!(
        "confirmed transaction with tx_hash {:?}",
        receipt.transaction_hash()
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use alloy::{
        consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom},
        primitives::{address, Bloom, B256},
        providers::{ProviderBuilder, RootProvider},
        rpc::types::TransactionReceipt,
        transports::mock::Asserter,
    };

    use super::*;
    use crate::contracts_bindings::TestCommon;

    const CONTRACT: Address = address!("2222222222222222222222222222222222222222");

    fn mocked() -> (Asserter, RootProvider) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        (asserter, provider)
    }

    fn receipt(tx_hash: TxHash, status: bool) -> TransactionReceipt {
        TransactionReceipt {
            inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
                receipt: Receipt {
                    status: Eip658Value::Eip658(status),
                    cumulative_gas_used: 21_000,
                    logs: vec![],
                },
                logs_bloom: Bloom::ZERO,
            }),
            transaction_hash: tx_hash,
            transaction_index: Some(0),
            block_hash: Some(B256::repeat_byte(0x0b)),
            block_number: Some(1),
            gas_used: 21_000,
            effective_gas_price: 1,
            blob_gas_used: None,
            blob_gas_price: None,
            from: Address::repeat_byte(0x01),
            to: Some(CONTRACT),
            contract_address: None,
        }
    }

    async fn set_updater(provider: &RootProvider) -> Result<TransactionReceipt, ChainCommunicationError> {
        let contract = TestCommon::new(CONTRACT, provider.clone());
        let call = contract.setUpdater(Address::repeat_byte(0x42));
        report_tx_with_timeout(CONTRACT, call, Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn mined_transaction_returns_its_receipt() {
        let (asserter, provider) = mocked();
        let tx_hash = B256::repeat_byte(0xaa);
        asserter.push_success(&tx_hash);
        asserter.push_success(&receipt(tx_hash, true));

        let mined = set_updater(&provider).await.unwrap();
        assert_eq!(mined.transaction_hash, tx_hash);
        assert!(mined.status());
    }

    #[tokio::test]
    async fn failed_status_is_reported_as_reverted() {
        let (asserter, provider) = mocked();
        let tx_hash = B256::repeat_byte(0xbb);
        asserter.push_success(&tx_hash);
        asserter.push_success(&receipt(tx_hash, false));

        assert!(matches!(
            set_updater(&provider).await,
            Err(ChainCommunicationError::Reverted(hash)) if hash == tx_hash
        ));
    }

    #[tokio::test]
    async fn unknown_transaction_without_receipt_is_dropped() {
        let (asserter, provider) = mocked();
        let tx_hash = B256::repeat_byte(0xcc);
        asserter.push_success(&tx_hash);
        // eth_getTransactionReceipt, then eth_getTransactionByHash
        asserter.push_success(&Option::<()>::None);
        asserter.push_success(&Option::<()>::None);

        assert!(matches!(
            set_updater(&provider).await,
            Err(ChainCommunicationError::DroppedError(hash)) if hash == tx_hash
        ));
    }

    #[tokio::test]
    async fn rejected_submission_is_a_transport_error() {
        let (asserter, provider) = mocked();
        asserter.push_failure_msg("insufficient funds");

        assert!(matches!(
            set_updater(&provider).await,
            Err(ChainCommunicationError::Contract(_))
        ));
    }

    #[tokio::test]
    async fn receipt_not_arriving_in_time_is_a_timeout() {
        let tx_hash = B256::repeat_byte(0xdd);
        let never = std::future::pending::<Result<TransactionReceipt, ChainCommunicationError>>();

        assert!(matches!(
            confirm(tx_hash, Duration::from_millis(10), never).await,
            Err(ChainCommunicationError::DispatchTimeout(hash)) if hash == tx_hash
        ));
    }
}
