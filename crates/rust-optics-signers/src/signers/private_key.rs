use std::{convert::Infallible, str::FromStr};

use secp256k1::{Message, SecretKey, SECP256K1};

use crate::{Error, PublicKey, RecoverableSignature, Sign};

/// Signer backed by a secp256k1 secret key held in memory.
#[derive(Clone)]
pub struct Signer {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeySigner")
            .field("address", &self.public_key.address())
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(secret_key: SecretKey) -> Self {
        let public_key = secp256k1::PublicKey::from_secret_key(SECP256K1, &secret_key).into();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Creates a signer with a freshly generated key.
    pub fn random() -> Self {
        Self::new(SecretKey::new(&mut rand::thread_rng()))
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl FromStr for Signer {
    type Err = Error;

    /// Parses a hex encoded secret key, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x"))?;
        let secret_key = SecretKey::from_slice(&bytes)?;
        Ok(Self::new(secret_key))
    }
}

#[async_trait::async_trait]
impl Sign for Signer {
    type Error = Infallible;

    async fn sign_digest(&self, message: &Message) -> Result<RecoverableSignature, Self::Error> {
        Ok(SECP256K1
            .sign_ecdsa_recoverable(message, &self.secret_key)
            .into())
    }

    fn public_key(&self) -> PublicKey {
        self.public_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signature_recovers_to_signer_key() {
        let signer = Signer::random();
        let message = Message::from_slice(&[0x42u8; 32]).unwrap();

        let signature = signer.sign_digest(&message).await.unwrap();
        let recovered = SECP256K1.recover_ecdsa(&message, &signature).unwrap();

        assert_eq!(PublicKey::from(recovered), signer.public_key());
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(Signer::from_str("0x1234").is_err());
        assert!(Signer::from_str("not hex").is_err());
        assert!(Signer::from_str(&"00".repeat(32)).is_err());
    }

    #[test]
    fn debug_does_not_leak_the_key() {
        let signer = Signer::from_str(&"11".repeat(32)).unwrap();
        let debug = format!("{signer:?}");
        assert!(!debug.contains(&"11".repeat(32)));
        assert!(debug.contains("address"));
    }
}
