//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Backend endpoints
pub const TOKEN_ENDPOINT: &str = "/api/token/";
pub const TOKEN_REFRESH_ENDPOINT: &str = "/api/token/refresh/";
pub const UPLOAD_ENDPOINT: &str = "/upload/";
pub const HISTORY_ENDPOINT: &str = "/history/";

// Persisted credential keys (fixed names, survive restarts)
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// Client defaults
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_KEYRING_SERVICE: &str = "FlowDash";

// The backend keeps only the most recent datasets
pub const HISTORY_LIMIT: usize = 5;
