//! Credential store
//!
//! Single source of truth for the current access/renewal credential
//! pair. Every mutation updates the in-memory snapshot the request
//! pipeline reads at dispatch time and persists through the
//! [`TokenStorage`] seam, so the pair survives process restarts.
//!
//! The pipeline never mutates this store; only the renewal coordinator
//! and the login/logout operations do.

use std::sync::Arc;

use flowdash_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use flowdash_domain::TokenPair;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::storage::{StorageError, TokenStorage};

/// Durable holder for the current credential pair
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
    current: RwLock<TokenPair>,
}

impl CredentialStore {
    /// Create a store backed by the given durable storage provider
    ///
    /// The in-memory snapshot starts empty; call [`Self::load`] on
    /// startup to restore persisted credentials.
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage, current: RwLock::new(TokenPair::empty()) }
    }

    /// Restore persisted credentials into the in-memory snapshot
    ///
    /// # Returns
    /// `true` if an access credential was restored
    ///
    /// # Errors
    /// Returns error if the storage backend fails
    pub async fn load(&self) -> Result<bool, StorageError> {
        let access = self.storage.get(ACCESS_TOKEN_KEY).await?;
        let renewal = self.storage.get(REFRESH_TOKEN_KEY).await?;

        let restored = access.is_some();
        *self.current.write().await = TokenPair { access, renewal };

        if restored {
            info!("credential store restored persisted session");
        } else {
            debug!("no persisted credentials found");
        }
        Ok(restored)
    }

    /// Snapshot of the current credential pair
    ///
    /// The pipeline reads this once per dispatch, so a concurrent clear
    /// can never produce a half-attached header.
    pub async fn get(&self) -> TokenPair {
        self.current.read().await.clone()
    }

    /// `Authorization` header value for the current access credential
    pub async fn bearer(&self) -> Option<String> {
        self.current.read().await.bearer()
    }

    /// Whether an access credential is currently present
    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_authenticated()
    }

    /// Replace the access credential
    ///
    /// `None` removes both the cached and the persisted value, so no
    /// stale `Authorization` header can survive a clear.
    ///
    /// # Errors
    /// Returns error if the storage backend fails; the in-memory
    /// snapshot is updated regardless so the session state stays
    /// consistent for in-flight calls.
    pub async fn set_access(&self, token: Option<String>) -> Result<(), StorageError> {
        self.current.write().await.access = token.clone();
        match token {
            Some(value) => self.storage.set(ACCESS_TOKEN_KEY, &value).await,
            None => self.storage.remove(ACCESS_TOKEN_KEY).await,
        }
    }

    /// Replace the renewal credential
    ///
    /// # Errors
    /// Returns error if the storage backend fails
    pub async fn set_renewal(&self, token: Option<String>) -> Result<(), StorageError> {
        self.current.write().await.renewal = token.clone();
        match token {
            Some(value) => self.storage.set(REFRESH_TOKEN_KEY, &value).await,
            None => self.storage.remove(REFRESH_TOKEN_KEY).await,
        }
    }

    /// Replace both credentials at once (successful login)
    ///
    /// # Errors
    /// Returns error if the storage backend fails
    pub async fn set_pair(&self, pair: TokenPair) -> Result<(), StorageError> {
        *self.current.write().await = pair.clone();

        match pair.access {
            Some(value) => self.storage.set(ACCESS_TOKEN_KEY, &value).await?,
            None => self.storage.remove(ACCESS_TOKEN_KEY).await?,
        }
        match pair.renewal {
            Some(value) => self.storage.set(REFRESH_TOKEN_KEY, &value).await?,
            None => self.storage.remove(REFRESH_TOKEN_KEY).await?,
        }

        info!("credential pair stored");
        Ok(())
    }

    /// Clear both credentials (logout or renewal failure)
    ///
    /// # Errors
    /// Returns error if the storage backend fails; the in-memory
    /// snapshot is cleared first either way.
    pub async fn clear(&self) -> Result<(), StorageError> {
        *self.current.write().await = TokenPair::empty();
        self.storage.remove(ACCESS_TOKEN_KEY).await?;
        self.storage.remove(REFRESH_TOKEN_KEY).await?;
        info!("credentials cleared");
        Ok(())
    }
}
