//! Common data types used throughout the application

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single uploaded data row, as returned by the backend rows preview.
///
/// The backend echoes CSV rows with their original column headers, so the
/// shape is free-form (`Equipment Name`, `Flowrate`, ...).
pub type DataRow = serde_json::Map<String, serde_json::Value>;

/// Access/renewal credential pair for the authenticated request pipeline
///
/// Either field may be absent:
/// - `access` absent means no `Authorization` header is attached to
///   outbound calls.
/// - `renewal` absent means a credential renewal cannot be attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived token authorizing a single request
    pub access: Option<String>,

    /// Longer-lived token used solely to obtain a new access token
    pub renewal: Option<String>,
}

impl TokenPair {
    /// Create a pair with both credentials present
    #[must_use]
    pub fn new(access: impl Into<String>, renewal: impl Into<String>) -> Self {
        Self { access: Some(access.into()), renewal: Some(renewal.into()) }
    }

    /// An empty pair (unauthenticated session)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether an access credential is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access.is_some()
    }

    /// `Authorization` header value for the current access credential,
    /// or `None` when the session is unauthenticated
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.access.as_ref().map(|token| format!("Bearer {token}"))
    }
}

/// Derived summary for one uploaded dataset
///
/// Matches the backend's dataset serializer: per-column averages and
/// extrema, the per-type count distribution, and a preview of the first
/// rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: i64,
    pub uploaded_at: DateTime<Utc>,

    pub total_count: i64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,

    #[serde(default)]
    pub min_flowrate: f64,
    #[serde(default)]
    pub min_pressure: f64,
    #[serde(default)]
    pub min_temperature: f64,

    #[serde(default)]
    pub max_flowrate: f64,
    #[serde(default)]
    pub max_pressure: f64,
    #[serde(default)]
    pub max_temperature: f64,

    /// Equipment type -> row count
    #[serde(default)]
    pub type_distribution: BTreeMap<String, u64>,

    /// Preview of the first uploaded rows
    #[serde(default)]
    pub rows: Vec<DataRow>,
}
