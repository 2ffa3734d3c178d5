//! Durable token storage
//!
//! Abstracts the key/value store that keeps credentials across process
//! restarts. The production provider writes to the platform keychain
//! (macOS Keychain Access, Windows Credential Manager, Linux Secret
//! Service); tests use the in-memory provider from [`crate::testing`].

use async_trait::async_trait;
use keyring::Entry;
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for durable storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying keychain/backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Trait for durable credential storage
///
/// The credential store persists through this seam so tests can swap in
/// an in-memory backend.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Read a stored value, `None` when the key has never been written
    /// or was removed
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value under the given key, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a stored value (idempotent)
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Platform keychain storage provider
///
/// Values are stored as passwords under `(service, key)` entries.
pub struct KeyringStorage {
    service: String,
}

impl KeyringStorage {
    /// Create a provider for a keychain service name (e.g. "FlowDash")
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(StorageError::from)
    }
}

#[async_trait]
impl TokenStorage for KeyringStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => {
                warn!(service = %self.service, key = %key, error = %err, "keychain read failed");
                Err(err.into())
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?.set_password(value)?;
        debug!(service = %self.service, key = %key, "credential persisted");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, key = %key, "credential removed");
                Ok(())
            }
            Err(err) => {
                warn!(service = %self.service, key = %key, error = %err, "keychain delete failed");
                Err(err.into())
            }
        }
    }
}
