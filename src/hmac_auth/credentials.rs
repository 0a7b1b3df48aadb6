//! Credential set and secret resolution.
//!
//! Credentials are loaded once at startup and never mutated, so lookups
//! need no locking.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use thiserror::Error;

/// Shared secret bytes. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Vec<u8>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes redacted>)", self.0.len())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential key id must not be empty")]
    EmptyKeyId,
    #[error("secret for key id '{0}' must not be empty")]
    EmptySecret(String),
    #[error("duplicate credential key id '{0}'")]
    DuplicateKeyId(String),
}

/// Immutable key id -> secret mapping.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    keys: HashMap<String, Secret>,
}

impl CredentialStore {
    /// Build from `(key_id, secret)` pairs, rejecting duplicates and empty values.
    pub fn from_pairs<I, K, S>(pairs: I) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Vec<u8>>,
    {
        let mut keys = HashMap::new();
        for (key_id, secret) in pairs {
            let key_id = key_id.into();
            let secret = secret.into();
            if key_id.is_empty() {
                return Err(CredentialError::EmptyKeyId);
            }
            if secret.is_empty() {
                return Err(CredentialError::EmptySecret(key_id));
            }
            if keys.contains_key(&key_id) {
                return Err(CredentialError::DuplicateKeyId(key_id));
            }
            keys.insert(key_id, Secret::new(secret));
        }
        Ok(Self { keys })
    }

    /// Build from the configured `keys` map.
    pub fn from_config(keys: &BTreeMap<String, String>) -> Result<Self, CredentialError> {
        Self::from_pairs(
            keys.iter()
                .map(|(id, secret)| (id.clone(), secret.as_bytes().to_vec())),
        )
    }

    /// Resolve the secret for a key id. `None` for unknown ids.
    pub fn resolve(&self, key_id: &str) -> Option<&Secret> {
        self.keys.get(key_id)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
