//! Dashboard API operations
//!
//! Typed calls on top of the request pipeline: login/logout, CSV
//! upload, history, and PDF report download. Everything except login
//! goes through the pipeline; login exchanges credentials directly
//! because a 401 there means bad credentials, not an expired session.

use std::sync::Arc;
use std::time::Duration;

use flowdash_domain::constants::{
    HISTORY_ENDPOINT, TOKEN_ENDPOINT, UPLOAD_ENDPOINT,
};
use flowdash_domain::{ClientConfig, DatasetSummary, TokenPair};
use reqwest::{header, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::errors::ApiError;
use crate::auth::{CredentialStore, RenewalCoordinator, TokenStorage};
use crate::http::HttpClient;
use crate::pipeline::{ApiRequest, RequestPipeline};

#[derive(Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// A downloaded PDF report
#[derive(Debug, Clone)]
pub struct ReportDownload {
    /// Filename suggested by the backend's `Content-Disposition`
    pub file_name: String,
    /// Raw PDF bytes
    pub bytes: Vec<u8>,
}

/// Client for the dashboard backend
pub struct DashboardClient {
    http: HttpClient,
    store: Arc<CredentialStore>,
    pipeline: RequestPipeline,
    base_url: String,
}

impl DashboardClient {
    /// Create a client for the configured backend
    ///
    /// # Errors
    /// Returns error for an invalid configuration or if the HTTP
    /// transport cannot be constructed
    pub fn new(
        config: &ClientConfig,
        storage: Arc<dyn TokenStorage>,
    ) -> Result<Self, ApiError> {
        config.validate().map_err(|err| ApiError::Config(err.to_string()))?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("flowdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build HTTP client: {err}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let store = Arc::new(CredentialStore::new(storage));
        let coordinator =
            Arc::new(RenewalCoordinator::new(http.clone(), store.clone(), base_url.clone()));
        let pipeline =
            RequestPipeline::new(http.clone(), store.clone(), coordinator, base_url.clone());

        Ok(Self { http, store, pipeline, base_url })
    }

    /// Restore a persisted session from durable storage
    ///
    /// Should be called on startup.
    ///
    /// # Returns
    /// `true` if an access credential was restored
    ///
    /// # Errors
    /// Returns error if durable storage fails
    pub async fn initialize(&self) -> Result<bool, ApiError> {
        self.store
            .load()
            .await
            .map_err(|err| ApiError::Config(format!("failed to restore session: {err}")))
    }

    /// Whether an access credential is currently present
    pub async fn is_authenticated(&self) -> bool {
        self.store.is_authenticated().await
    }

    /// The credential store backing this client
    #[must_use]
    pub fn store(&self) -> Arc<CredentialStore> {
        self.store.clone()
    }

    /// Exchange username/password for a credential pair
    ///
    /// On success the pair is stored directly; no prior access
    /// credential is involved.
    ///
    /// # Errors
    /// Returns [`ApiError::Auth`] on bad credentials, other variants on
    /// transport or decode failures.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let url = format!("{}{}", self.base_url, TOKEN_ENDPOINT);
        let request = self.http.request(Method::POST, &url).json(&serde_json::json!({
            "username": username,
            "password": password,
        }));

        let response = self.http.send(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            let detail = error_detail(response).await;
            return Err(ApiError::Auth(detail.unwrap_or_else(|| "invalid credentials".to_string())));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &url, body));
        }

        let body: LoginResponse =
            response.json().await.map_err(|err| ApiError::Decode(err.to_string()))?;
        let pair = TokenPair::new(body.access, body.refresh);

        self.store
            .set_pair(pair.clone())
            .await
            .map_err(|err| ApiError::Config(format!("failed to persist credentials: {err}")))?;

        info!("login succeeded");
        Ok(pair)
    }

    /// Clear the session, locally and in durable storage
    ///
    /// # Errors
    /// Returns error if durable storage fails
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.store
            .clear()
            .await
            .map_err(|err| ApiError::Config(format!("failed to clear credentials: {err}")))?;
        info!("logged out");
        Ok(())
    }

    /// Upload a CSV file and receive its derived summary
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] when the backend rejects the
    /// file, the usual pipeline errors otherwise.
    #[instrument(skip(self, bytes), fields(file_name = %file_name, size = bytes.len()))]
    pub async fn upload_csv(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DatasetSummary, ApiError> {
        let request = ApiRequest::upload_csv(UPLOAD_ENDPOINT, file_name, bytes);
        let response = self.pipeline.send(&request).await?;
        let summary = read_json(response, UPLOAD_ENDPOINT).await?;
        info!("CSV uploaded");
        Ok(summary)
    }

    /// Fetch the most recent dataset summaries (backend keeps 5)
    ///
    /// # Errors
    /// Returns the usual pipeline errors.
    #[instrument(skip(self))]
    pub async fn fetch_history(&self) -> Result<Vec<DatasetSummary>, ApiError> {
        let response = self.pipeline.send(&ApiRequest::get(HISTORY_ENDPOINT)).await?;
        read_json(response, HISTORY_ENDPOINT).await
    }

    /// Download the PDF report for a dataset
    ///
    /// The filename comes from the `Content-Disposition` header, with a
    /// deterministic fallback when absent.
    ///
    /// # Errors
    /// Returns [`ApiError::NotFound`] for unknown datasets, the usual
    /// pipeline errors otherwise.
    #[instrument(skip(self))]
    pub async fn download_report(&self, dataset_id: i64) -> Result<ReportDownload, ApiError> {
        let path = format!("/datasets/{dataset_id}/report.pdf");
        let response = self.pipeline.send(&ApiRequest::get(path.clone())).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status_error(status, &path, body));
        }

        let file_name = suggested_filename(&response)
            .unwrap_or_else(|| format!("dataset_{dataset_id}_report.pdf"));
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?
            .to_vec();

        debug!(file_name = %file_name, size = bytes.len(), "report downloaded");
        Ok(ReportDownload { file_name, bytes })
    }
}

/// Classify a non-success status the way the error taxonomy demands
fn map_status_error(status: StatusCode, path: &str, body: String) -> ApiError {
    let message = if body.is_empty() {
        format!("{path} returned status {status}")
    } else {
        format!("{path} returned status {status}: {body}")
    };

    if status == StatusCode::BAD_REQUEST {
        ApiError::Validation(message)
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ApiError::Auth(message)
    } else if status == StatusCode::NOT_FOUND {
        ApiError::NotFound(message)
    } else if status.is_client_error() {
        ApiError::Client(message)
    } else if status.is_server_error() {
        ApiError::Server(message)
    } else {
        ApiError::Transport(message)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(map_status_error(status, path, body));
    }
    response.json().await.map_err(|err| ApiError::Decode(err.to_string()))
}

async fn error_detail(response: Response) -> Option<String> {
    response.json::<ErrorDetail>().await.ok().map(|body| body.detail)
}

/// Extract the filename from a `Content-Disposition` header value like
/// `attachment; filename="dataset_3_report.pdf"`
fn suggested_filename(response: &Response) -> Option<String> {
    let value = response.headers().get(header::CONTENT_DISPOSITION)?.to_str().ok()?;
    let (_, rest) = value.split_once("filename=")?;
    let name = rest.split(';').next()?.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
