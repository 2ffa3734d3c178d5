//! FlowDash backend client
//!
//! Everything needed to talk to the dashboard backend: credential
//! storage and renewal, the retry-on-401 request pipeline, and typed
//! API operations. The intended entry point is [`DashboardClient`];
//! the lower layers are exported for composition and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod pipeline;
pub mod testing;

pub use api::{ApiError, DashboardClient, ReportDownload};
pub use auth::{
    CredentialStore, KeyringStorage, RenewalCoordinator, RenewalError, StorageError, TokenStorage,
};
pub use config::load_config;
pub use http::{HttpClient, HttpClientBuilder, TransportError};
pub use pipeline::{ApiRequest, RequestBody, RequestPipeline};
