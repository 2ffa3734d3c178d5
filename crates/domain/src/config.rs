//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_KEYRING_SERVICE, DEFAULT_TIMEOUT_SECS};
use crate::errors::{FlowDashError, Result};

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the dashboard backend
    pub base_url: String,
    /// Fixed deadline applied to every dispatched request, in seconds
    pub timeout_seconds: u64,
    /// Keychain service name used for credential persistence
    pub keyring_service: String,
}

impl ClientConfig {
    /// Check that the configuration is usable
    ///
    /// # Errors
    /// Returns [`FlowDashError::Config`] for an empty or non-HTTP base
    /// URL or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(FlowDashError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(FlowDashError::Config("timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            keyring_service: DEFAULT_KEYRING_SERVICE.to_string(),
        }
    }
}
