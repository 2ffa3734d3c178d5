//! Authenticated request pipeline
//!
//! Every outbound domain call goes through [`RequestPipeline::send`]:
//! attach the current access credential, dispatch, and on a 401 renew
//! the credential through the single-flight coordinator and replay the
//! call exactly once. A second 401 on the same logical call is
//! terminal; nothing here can loop.
//!
//! Requests are described as rebuildable values rather than prepared
//! `RequestBuilder`s so the replay can reconstruct the body (including
//! multipart uploads) without relying on `try_clone`.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};
use reqwest::{header, Method, Response, StatusCode};
use tracing::{debug, instrument};

use crate::api::ApiError;
use crate::auth::{CredentialStore, RenewalCoordinator};
use crate::http::HttpClient;

/// Rebuildable request body
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON payload
    Json(serde_json::Value),
    /// Multipart upload with a single `file` field
    CsvFile {
        file_name: String,
        bytes: Vec<u8>,
    },
}

/// One logical outbound call
///
/// Owned by the pipeline for the duration of the call, including its
/// single permitted retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    /// GET request for a backend path
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), body: RequestBody::Empty }
    }

    /// POST request with a JSON payload
    #[must_use]
    pub fn post_json(path: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { method: Method::POST, path: path.into(), body: RequestBody::Json(payload) }
    }

    /// POST request uploading a CSV file as multipart field `file`
    #[must_use]
    pub fn upload_csv(path: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::CsvFile { file_name: file_name.into(), bytes },
        }
    }
}

/// The attach → dispatch → detect-401 → renew-and-retry middleware
pub struct RequestPipeline {
    http: HttpClient,
    store: Arc<CredentialStore>,
    coordinator: Arc<RenewalCoordinator>,
    base_url: String,
}

impl RequestPipeline {
    /// Create a pipeline for the given backend
    pub fn new(
        http: HttpClient,
        store: Arc<CredentialStore>,
        coordinator: Arc<RenewalCoordinator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self { http, store, coordinator, base_url: base_url.into() }
    }

    /// Send one logical call, retrying once through credential renewal
    /// on a 401
    ///
    /// Non-401 responses (including 4xx/5xx) are returned unchanged for
    /// the caller to classify.
    ///
    /// # Errors
    /// - [`ApiError::Renewal`] when the 401 recovery path fails; the
    ///   session was cleared.
    /// - [`ApiError::Auth`] when a replayed call is rejected again.
    /// - [`ApiError::Timeout`] / [`ApiError::Transport`] on transport
    ///   failures; these never trigger renewal.
    #[instrument(skip(self), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut retried = false;

        loop {
            // Fresh snapshot each attempt: a renewal that happened while
            // this call was queued is picked up automatically, and a
            // concurrent clear can never leave a half-attached header.
            let bearer = self.store.bearer().await;
            let response = self.dispatch(request, bearer.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if retried {
                debug!("401 after replay, surfacing as terminal auth failure");
                return Err(ApiError::Auth(format!(
                    "{} rejected after credential renewal",
                    request.path
                )));
            }

            retried = true;
            debug!("401 received, renewing credentials");
            self.coordinator.renew().await?;
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(payload) => builder.json(payload),
            RequestBody::CsvFile { file_name, bytes } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("text/csv")
                    .map_err(|err| ApiError::Config(err.to_string()))?;
                builder.multipart(Form::new().part("file", part))
            }
        };

        Ok(self.http.send(builder).await?)
    }
}
