//! Configuration loading
//!
//! Settings resolve in order: defaults, then an optional `config.json`
//! next to the executable or in the working directory, then environment
//! variables. Environment always wins so deployments can override a
//! bundled file.

use std::path::Path;

use flowdash_domain::ClientConfig;
use serde::Deserialize;
use tracing::{debug, warn};

/// Environment variable overriding the backend base URL
pub const ENV_API_URL: &str = "FLOWDASH_API_URL";
/// Environment variable overriding the request deadline, in seconds
pub const ENV_TIMEOUT_SECS: &str = "FLOWDASH_TIMEOUT_SECS";
/// Environment variable overriding the keychain service name
pub const ENV_KEYRING_SERVICE: &str = "FLOWDASH_KEYRING_SERVICE";

/// Shape of `config.json`; every field optional
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    timeout_seconds: Option<u64>,
    keyring_service: Option<String>,
}

/// Resolve the effective configuration
///
/// # Errors
/// Returns error if `config.json` exists but cannot be parsed.
pub fn load_config() -> Result<ClientConfig, std::io::Error> {
    load_config_from(Path::new("config.json"), |key| std::env::var(key).ok())
}

/// Resolution with injectable file path and env lookup, for tests
fn load_config_from(
    file_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, std::io::Error> {
    let mut config = ClientConfig::default();

    if file_path.exists() {
        let raw = std::fs::read_to_string(file_path)?;
        let file: FileConfig = serde_json::from_str(&raw)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        if let Some(base_url) = file.base_url {
            config.base_url = base_url;
        }
        if let Some(timeout) = file.timeout_seconds {
            config.timeout_seconds = timeout;
        }
        if let Some(service) = file.keyring_service {
            config.keyring_service = service;
        }
        debug!(path = %file_path.display(), "loaded configuration file");
    }

    if let Some(base_url) = env(ENV_API_URL) {
        config.base_url = base_url;
    }
    if let Some(raw) = env(ENV_TIMEOUT_SECS) {
        match raw.parse::<u64>() {
            Ok(timeout) if timeout > 0 => config.timeout_seconds = timeout,
            _ => warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
        }
    }
    if let Some(service) = env(ENV_KEYRING_SERVICE) {
        config.keyring_service = service;
    }

    config.base_url = config.base_url.trim_end_matches('/').to_string();
    Ok(config)
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use std::collections::HashMap;

    use flowdash_domain::constants::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

    use super::*;

    fn env_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// With no file and no env, defaults apply.
    #[test]
    fn test_defaults() {
        let config = load_config_from(Path::new("/nonexistent/config.json"), |_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
    }

    /// File values override defaults, env overrides file.
    #[test]
    fn test_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"base_url": "http://file.example", "timeout_seconds": 10}"#,
        )
        .unwrap();

        let env = env_map(&[(ENV_API_URL, "http://env.example/")]);
        let config = load_config_from(&path, |key| env.get(key).cloned()).unwrap();

        assert_eq!(config.base_url, "http://env.example");
        assert_eq!(config.timeout_seconds, 10);
    }

    /// A malformed timeout is ignored rather than fatal.
    #[test]
    fn test_invalid_timeout_ignored() {
        let env = env_map(&[(ENV_TIMEOUT_SECS, "soon")]);
        let config =
            load_config_from(Path::new("/nonexistent/config.json"), |key| env.get(key).cloned())
                .unwrap();
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECS);
    }

    /// A malformed config file is a hard error.
    #[test]
    fn test_malformed_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = load_config_from(&path, |_| None);
        assert!(result.is_err());
    }
}
