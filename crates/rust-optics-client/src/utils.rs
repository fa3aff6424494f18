use secrecy::{ExposeSecret, Secret};
use url::Url;

use crate::errors::ConversionError;

/// A URL that may embed credentials (API keys in the path or query). The
/// inner value is never printed by `Debug`.
#[derive(Debug, Clone)]
pub struct SecretUrl {
    inner: Secret<String>,
}

impl SecretUrl {
    pub fn new(url: Url) -> Self {
        Self {
            inner: Secret::new(url.to_string()),
        }
    }
}

impl PartialEq for SecretUrl {
    fn eq(&self, other: &Self) -> bool {
        self.inner.expose_secret() == other.inner.expose_secret()
    }
}

impl TryFrom<SecretUrl> for Url {
    type Error = ConversionError;

    fn try_from(secret_url: SecretUrl) -> Result<Self, Self::Error> {
        Ok(Url::parse(secret_url.inner.expose_secret())?)
    }
}

impl TryFrom<SecretUrl> for String {
    type Error = ConversionError;

    fn try_from(secret_url: SecretUrl) -> Result<Self, Self::Error> {
        Ok(secret_url.inner.expose_secret().clone())
    }
}

impl<'de> serde::Deserialize<'de> for SecretUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Url::deserialize(deserializer).map(SecretUrl::new)
    }
}
