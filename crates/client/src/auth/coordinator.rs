//! Single-flight credential renewal
//!
//! Guarantees that, no matter how many concurrent calls observe a 401
//! at roughly the same time, the refresh request is issued exactly once
//! per failure episode and every caller receives the same outcome.
//!
//! The first caller of a failure episode becomes the leader: it issues
//! the refresh call and broadcasts the outcome. Callers arriving while
//! the call is in flight park on a oneshot channel in a FIFO queue that
//! only the coordinator touches.

use std::sync::Arc;

use flowdash_domain::constants::TOKEN_REFRESH_ENDPOINT;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use super::store::CredentialStore;
use crate::http::{HttpClient, TransportError};

/// Error type for renewal operations
///
/// `Clone` because one renewal outcome is broadcast to every waiter of
/// the episode. All variants are terminal for the session: the store is
/// cleared and callers must re-authenticate.
#[derive(Debug, Clone, Error)]
pub enum RenewalError {
    /// No renewal credential is available
    #[error("no renewal credential available")]
    NoRenewalToken,

    /// The server rejected the renewal credential (invalid/expired)
    #[error("renewal rejected: {0}")]
    Rejected(String),

    /// Network failure or timeout while renewing
    #[error("renewal transport failure: {0}")]
    Transport(String),

    /// The renewal response could not be decoded
    #[error("renewal response invalid: {0}")]
    Decode(String),
}

type RenewalOutcome = Result<String, RenewalError>;
type Waiter = oneshot::Sender<RenewalOutcome>;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Coordinates credential renewal across concurrent callers
///
/// The in-flight flag and the waiter queue are one value: `Some(queue)`
/// while a renewal is in flight, `None` otherwise. Both are mutated
/// only behind the coordinator's own mutex.
pub struct RenewalCoordinator {
    http: HttpClient,
    store: Arc<CredentialStore>,
    base_url: String,
    in_flight: Mutex<Option<Vec<Waiter>>>,
}

impl RenewalCoordinator {
    /// Create a coordinator for the given backend
    ///
    /// The renewal call goes through the same [`HttpClient`] as
    /// ordinary requests, so it carries the same fixed deadline and no
    /// waiter ever waits longer than one request timeout.
    pub fn new(http: HttpClient, store: Arc<CredentialStore>, base_url: impl Into<String>) -> Self {
        Self { http, store, base_url: base_url.into(), in_flight: Mutex::new(None) }
    }

    /// Obtain a fresh access credential, renewing at most once
    ///
    /// # Errors
    /// Returns [`RenewalError`] if the renewal credential is missing or
    /// the refresh call fails; in both cases the credential store ends
    /// empty and every concurrent caller receives the same error.
    pub async fn renew(&self) -> RenewalOutcome {
        let receiver = {
            let mut guard = self.in_flight.lock().await;
            match guard.as_mut() {
                Some(waiters) => {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    debug!(queued = waiters.len(), "renewal in flight, joining episode");
                    Some(receiver)
                }
                None => {
                    *guard = Some(Vec::new());
                    None
                }
            }
        };

        if let Some(receiver) = receiver {
            return match receiver.await {
                Ok(outcome) => outcome,
                // The coordinator never drops senders while an episode is
                // open, so this only fires if the owning client was torn
                // down mid-renewal.
                Err(_) => Err(RenewalError::Transport("renewal episode abandoned".to_string())),
            };
        }

        let outcome = self.execute_renewal().await;

        let waiters = {
            let mut guard = self.in_flight.lock().await;
            guard.take().unwrap_or_default()
        };

        if !waiters.is_empty() {
            debug!(waiters = waiters.len(), "broadcasting renewal outcome");
        }
        for waiter in waiters {
            // A waiter whose caller went away is skipped; shared state
            // was already settled above.
            let _ = waiter.send(outcome.clone());
        }

        outcome
    }

    /// Issue the refresh call and settle the credential store
    async fn execute_renewal(&self) -> RenewalOutcome {
        let renewal = self.store.get().await.renewal;

        let outcome = match renewal {
            None => Err(RenewalError::NoRenewalToken),
            Some(token) => self.request_new_access(&token).await,
        };

        match &outcome {
            Ok(access) => {
                if let Err(err) = self.store.set_access(Some(access.clone())).await {
                    warn!(error = %err, "renewed credential could not be persisted");
                }
                info!("access credential renewed");
            }
            Err(err) => {
                warn!(error = %err, "credential renewal failed, clearing session");
                if let Err(storage_err) = self.store.clear().await {
                    warn!(error = %storage_err, "credential store could not be cleared");
                }
            }
        }

        outcome
    }

    async fn request_new_access(&self, renewal_token: &str) -> RenewalOutcome {
        let url = format!("{}{}", self.base_url, TOKEN_REFRESH_ENDPOINT);
        let request = self
            .http
            .request(Method::POST, &url)
            .json(&RefreshRequest { refresh: renewal_token });

        let response = self.http.send(request).await.map_err(|err| match err {
            TransportError::Timeout(timeout) => {
                RenewalError::Transport(format!("timed out after {timeout:?}"))
            }
            other => RenewalError::Transport(other.to_string()),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let detail = response.text().await.unwrap_or_default();
            return Err(RenewalError::Rejected(if detail.is_empty() {
                "renewal credential invalid or expired".to_string()
            } else {
                detail
            }));
        }
        if !status.is_success() {
            return Err(RenewalError::Rejected(format!("refresh returned status {status}")));
        }

        let body: RefreshResponse =
            response.json().await.map_err(|err| RenewalError::Decode(err.to_string()))?;
        Ok(body.access)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::coordinator.
    use std::time::Duration;

    use flowdash_domain::TokenPair;
    use futures::future::join_all;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::MemoryStorage;

    fn http() -> HttpClient {
        HttpClient::builder().timeout(Duration::from_secs(5)).build().unwrap()
    }

    async fn coordinator_with_pair(
        server: &MockServer,
        pair: TokenPair,
    ) -> (Arc<RenewalCoordinator>, Arc<CredentialStore>) {
        let store = Arc::new(CredentialStore::new(Arc::new(MemoryStorage::new())));
        store.set_pair(pair).await.unwrap();
        let coordinator = Arc::new(RenewalCoordinator::new(http(), store.clone(), server.uri()));
        (coordinator, store)
    }

    /// A single caller renews and the store picks up the new access
    /// credential.
    #[tokio::test]
    async fn test_renew_success_updates_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .and(body_json(serde_json::json!({"refresh": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access": "A2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, store) = coordinator_with_pair(&server, TokenPair::new("A1", "R1")).await;

        let access = coordinator.renew().await.unwrap();
        assert_eq!(access, "A2");
        assert_eq!(store.get().await.access.as_deref(), Some("A2"));
        assert_eq!(store.get().await.renewal.as_deref(), Some("R1"));
    }

    /// N concurrent callers produce exactly one refresh network call,
    /// and all observe the same new credential.
    #[tokio::test]
    async fn test_single_flight_under_concurrency() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access": "A2"}))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, _store) =
            coordinator_with_pair(&server, TokenPair::new("A1", "R1")).await;

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.renew().await })
            })
            .collect();

        for outcome in join_all(callers).await {
            assert_eq!(outcome.unwrap().unwrap(), "A2");
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    /// A rejected renewal clears the store and every concurrent caller
    /// receives the rejection.
    #[tokio::test]
    async fn test_rejected_renewal_broadcasts_and_clears() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string("token expired")
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (coordinator, store) =
            coordinator_with_pair(&server, TokenPair::new("A1", "R1")).await;

        let callers: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.renew().await })
            })
            .collect();

        for outcome in join_all(callers).await {
            assert!(matches!(outcome.unwrap(), Err(RenewalError::Rejected(_))));
        }

        assert_eq!(store.get().await, TokenPair::empty());
    }

    /// With no renewal credential the coordinator fails immediately and
    /// issues no network call.
    #[tokio::test]
    async fn test_missing_renewal_credential_fails_fast() {
        let server = MockServer::start().await;

        let (coordinator, store) = coordinator_with_pair(
            &server,
            TokenPair { access: Some("A1".to_string()), renewal: None },
        )
        .await;

        let outcome = coordinator.renew().await;
        assert!(matches!(outcome, Err(RenewalError::NoRenewalToken)));
        assert_eq!(store.get().await, TokenPair::empty());

        let requests = server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }

    /// A second failure episode issues a second network call: the
    /// single-flight guarantee is per episode, not global.
    #[tokio::test]
    async fn test_new_episode_after_settlement() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token/refresh/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access": "A2"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let (coordinator, _store) =
            coordinator_with_pair(&server, TokenPair::new("A1", "R1")).await;

        coordinator.renew().await.unwrap();
        coordinator.renew().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }
}
