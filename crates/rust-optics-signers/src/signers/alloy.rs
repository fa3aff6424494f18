use ::alloy::{
    consensus::SignableTransaction,
    network::TxSigner,
    signers::{self as alloy_signer, Signer as AlloySigner},
};
use alloy_primitives::{Address, ChainId, Signature, B256, U256};
use secp256k1::Message;
use thiserror::Error;

use crate::Sign;

/// Adapts any [`Sign`] implementation into alloy's message and transaction
/// signer traits, so the updater key can also sign the transactions that
/// carry its updates.
#[derive(Debug, Clone)]
pub struct Signer<S> {
    inner_signer: S,
    chain_id: Option<ChainId>,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to create message from digest")]
    InvalidDigest,
    #[error("failed to sign")]
    Signer(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl<S> Signer<S> {
    pub fn new(inner_signer: S, chain_id: Option<ChainId>) -> Self {
        Self {
            inner_signer,
            chain_id,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner_signer
    }

    async fn sign_digest(&self, digest: &B256) -> Result<Signature, Error>
    where
        S: Sign,
    {
        let msg = Message::from_slice(digest.as_slice()).map_err(|_| Error::InvalidDigest)?;

        let sig = self
            .inner_signer
            .sign_digest(&msg)
            .await
            .map_err(|e| Error::Signer(Box::new(e)))?;

        Ok(Signature::new(
            U256::from_be_bytes(sig.r()),
            U256::from_be_bytes(sig.s()),
            sig.v() == 1,
        ))
    }
}

#[async_trait::async_trait]
impl<T> AlloySigner for Signer<T>
where
    T: Sign,
{
    /// Signs the hash as is; callers wanting the EIP-191 prefix use `sign_message`.
    async fn sign_hash(&self, hash: &B256) -> alloy_signer::Result<Signature> {
        self.sign_digest(hash)
            .await
            .map_err(alloy_signer::Error::other)
    }

    fn address(&self) -> Address {
        self.inner_signer.public_key().address()
    }

    fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    fn set_chain_id(&mut self, chain_id: Option<ChainId>) {
        self.chain_id = chain_id;
    }
}

#[async_trait::async_trait]
impl<T> TxSigner<Signature> for Signer<T>
where
    T: Sign,
{
    fn address(&self) -> Address {
        self.inner_signer.public_key().address()
    }

    /// Signs the transaction hash, pinning the signer's chain id on the
    /// transaction first when one is configured.
    async fn sign_transaction(
        &self,
        tx: &mut dyn SignableTransaction<Signature>,
    ) -> alloy_signer::Result<Signature> {
        if let Some(chain_id) = self.chain_id {
            if !tx.set_chain_id_checked(chain_id) {
                return Err(alloy_signer::Error::TransactionChainIdMismatch {
                    signer: chain_id,
                    tx: tx.chain_id().unwrap_or_default(),
                });
            }
        }
        self.sign_hash(&tx.signature_hash()).await
    }
}
