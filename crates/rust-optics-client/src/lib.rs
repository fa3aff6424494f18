pub mod agent;
pub mod common_client;
pub mod contracts_bindings;
pub mod dispatch;
pub mod errors;
pub mod test_common;
pub mod utils;
pub mod watcher;
// So users can use the client without having to depend on the signers and common crates as well.
pub use rust_optics_common;
pub use rust_optics_signers;

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{Address, Bytes, B256, U256},
        providers::{Provider, ProviderBuilder},
    };
    use dotenv::dotenv;
    use rust_optics_common::{
        home_domain_hash, CommonState, DoubleUpdate, LocalCommon, SignedUpdate, Update,
    };
    use rust_optics_signers::{signers::private_key::Signer as PrivateKeySigner, Sign};
    use serial_test::serial;

    use crate::{
        common_client::CommonClient,
        errors::CommonClientError,
        test_common::TestCommonFactory,
        watcher::{UpdateWatcher, WatcherConfig},
    };

    const LOCAL_DOMAIN: u32 = 1000;

    async fn deploy(updater: Address) -> CommonClient {
        dotenv().ok();
        let provider = ProviderBuilder::new().connect_anvil_with_wallet().erased();
        let factory = TestCommonFactory::new(provider);
        let instance = factory.deploy(LOCAL_DOMAIN, updater).await.unwrap();
        CommonClient::from_instance(instance)
    }

    #[ignore = "requires a local anvil binary"]
    #[tokio::test]
    #[serial]
    async fn test_deployed_contract_matches_local_mirror() {
        let updater = PrivateKeySigner::random();
        let updater_address = updater.public_key().address();
        let client = deploy(updater_address).await;
        let local = LocalCommon::new(LOCAL_DOMAIN, updater_address);

        assert_eq!(client.state().await.unwrap(), CommonState::Active);
        assert_eq!(client.local_domain().await.unwrap(), LOCAL_DOMAIN);
        assert_eq!(client.updater().await.unwrap(), updater_address);
        assert_eq!(client.current().await.unwrap(), local.current());
        assert_eq!(client.queue_end().await.unwrap(), local.queue_end());
        assert_eq!(client.queue_length().await.unwrap(), U256::ZERO);
        assert!(!client.queue_contains(B256::repeat_byte(1)).await.unwrap());
        assert_eq!(
            client.home_domain_hash().await.unwrap(),
            home_domain_hash(LOCAL_DOMAIN)
        );
        assert_eq!(local.home_domain_hash(), home_domain_hash(LOCAL_DOMAIN));

        let update = Update::new(LOCAL_DOMAIN, B256::repeat_byte(1), B256::repeat_byte(2))
            .sign_with(&updater)
            .await
            .unwrap();
        assert!(client.is_updater_signature(&update).await.unwrap());
        assert!(local
            .is_updater_signature(
                update.update.previous_root,
                update.update.new_root,
                &update.signature
            )
            .unwrap());

        let intruder = PrivateKeySigner::random();
        let forged = Update::new(LOCAL_DOMAIN, B256::repeat_byte(1), B256::repeat_byte(2))
            .sign_with(&intruder)
            .await
            .unwrap();
        assert!(!client.is_updater_signature(&forged).await.unwrap());

        // ECDSA.recover reverts on malformed signatures on both sides.
        let malformed = SignedUpdate::new(update.update, Bytes::new());
        assert!(client.is_updater_signature(&malformed).await.is_err());
        assert!(local
            .is_updater_signature(
                malformed.update.previous_root,
                malformed.update.new_root,
                &malformed.signature
            )
            .is_err());
    }

    #[ignore = "requires a local anvil binary"]
    #[tokio::test]
    #[serial]
    async fn test_double_update_fails_the_contract() {
        let updater = PrivateKeySigner::random();
        let client = deploy(updater.public_key().address()).await;

        let old = B256::repeat_byte(1);
        let first = Update::new(LOCAL_DOMAIN, old, B256::repeat_byte(2))
            .sign_with(&updater)
            .await
            .unwrap();
        let second = Update::new(LOCAL_DOMAIN, old, B256::repeat_byte(3))
            .sign_with(&updater)
            .await
            .unwrap();
        let double = DoubleUpdate::new(first, second).unwrap();

        let receipt = client.double_update(&double).await.unwrap();
        assert!(receipt.status());
        assert_eq!(client.state().await.unwrap(), CommonState::Failed);

        let head = client.block_number().await.unwrap();
        let events = client.double_updates(0, head).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].old_root, old);
        assert_eq!(events[0].new_root, double.new_roots());

        assert!(matches!(
            client.double_update(&double).await,
            Err(CommonClientError::FailedState)
        ));

        // A failed contract stops the watcher right away.
        let mut watcher = UpdateWatcher::new(client, WatcherConfig::default()).unwrap();
        watcher.run().await.unwrap();
    }

    #[ignore = "requires a local anvil binary"]
    #[tokio::test]
    #[serial]
    async fn test_set_updater() {
        let client = deploy(Address::repeat_byte(0x42)).await;
        let new_updater = PrivateKeySigner::random().public_key().address();

        client.set_updater(new_updater).await.unwrap();
        assert_eq!(client.updater().await.unwrap(), new_updater);
    }
}
