use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Method;
use tracing::{debug, info, warn};
use vpnhub_core::{endpoints, RefreshRequest, RefreshResponse};

use crate::error::{ClientError, StoreError};
use crate::request::join_url;
use crate::store::{CredentialStore, Slot};
use crate::transport::{Transport, TransportRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated,
}

#[derive(Default)]
struct Credentials {
    access: Option<String>,
    refresh: Option<String>,
}

/// Sole owner of the access/refresh credential pair.
///
/// The in-memory pair is authoritative; the [`CredentialStore`] is a durable
/// cache written on every successful login or refresh and on every clear.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    refresh_url: String,
    state: RwLock<Credentials>,
}

impl CredentialManager {
    /// Builds a manager holding whatever `store` already contains.
    pub fn load(
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
        base_url: &str,
    ) -> Result<Self, ClientError> {
        let access = store.load(Slot::AccessToken)?;
        let refresh = store.load(Slot::RefreshToken)?;
        debug!(
            has_access = access.is_some(),
            has_refresh = refresh.is_some(),
            "loaded stored credentials"
        );
        Ok(Self {
            store,
            transport,
            refresh_url: join_url(base_url, endpoints::AUTH_REFRESH),
            state: RwLock::new(Credentials { access, refresh }),
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Credentials> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn access(&self) -> Option<String> {
        self.read_state().access.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read_state().refresh.clone()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        if self.read_state().access.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        }
    }

    /// Stores a freshly issued pair. Without a refresh token any previously
    /// held one is dropped.
    pub fn set_from_login(&self, access: &str, refresh: Option<&str>) -> Result<(), ClientError> {
        let mut state = self.write_state();
        self.persist(state.access.as_deref(), access, refresh)?;
        state.access = Some(access.to_string());
        state.refresh = refresh.map(str::to_string);
        info!(has_refresh = refresh.is_some(), "stored login credentials");
        Ok(())
    }

    /// Exchanges the held refresh token for a new access token.
    ///
    /// Returns `false` on any failure and leaves the held pair untouched; the
    /// caller decides whether to [`clear`](Self::clear). Returns `true` when
    /// a newer pair was stored while the call was in flight, even if the
    /// server rejected the superseded refresh token.
    pub async fn refresh(&self) -> bool {
        match self.try_refresh().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "token refresh failed");
                false
            }
        }
    }

    async fn try_refresh(&self) -> Result<(), ClientError> {
        let refresh_token = self.refresh_token().ok_or_else(|| {
            ClientError::AuthenticationFailed("no refresh token held".to_string())
        })?;
        let exchanged = self.exchange(&refresh_token).await;

        let mut state = self.write_state();
        if state.refresh.as_deref() != Some(refresh_token.as_str()) {
            // The pair changed while the refresh call was in flight; whatever
            // the server said about the old refresh token no longer matters.
            if state.access.is_some() {
                debug!("credentials replaced during refresh; keeping the newer pair");
                return Ok(());
            }
            return Err(ClientError::AuthenticationFailed(
                "credentials cleared during refresh".to_string(),
            ));
        }
        let (access, next_refresh) = exchanged?;
        self.persist(state.access.as_deref(), &access, Some(&next_refresh))?;
        state.access = Some(access);
        state.refresh = Some(next_refresh);
        info!("access token refreshed");
        Ok(())
    }

    /// Posts `refresh_token` to the refresh endpoint and returns the issued
    /// access token with the refresh token to keep.
    async fn exchange(&self, refresh_token: &str) -> Result<(String, String), ClientError> {
        let payload = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let body = serde_json::to_vec(&payload)
            .map_err(|err| ClientError::InvalidRequest(err.to_string()))?;
        let request = TransportRequest {
            method: Method::POST,
            url: self.refresh_url.clone(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        };

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(ClientError::http(response.status, &response.body));
        }
        let parsed: RefreshResponse = serde_json::from_slice(&response.body)
            .map_err(|err| ClientError::ResponseFormat(err.to_string()))?;
        let access = parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ClientError::ResponseFormat("refresh response has no token".to_string())
            })?;
        let next_refresh = parsed
            .refresh_token
            .filter(|token| !token.is_empty())
            .unwrap_or_else(|| refresh_token.to_string());
        Ok((access, next_refresh))
    }

    /// Forgets both credentials. Safe to call when already empty; storage
    /// errors are logged and never surfaced.
    pub fn clear(&self) {
        let mut state = self.write_state();
        let had_credentials = state.access.is_some() || state.refresh.is_some();
        *state = Credentials::default();
        for slot in [Slot::AccessToken, Slot::RefreshToken] {
            if let Err(err) = self.store.remove(slot) {
                warn!(slot = slot.as_str(), error = %err, "failed to remove stored credential");
            }
        }
        if had_credentials {
            info!("credentials cleared");
        }
    }

    /// Writes both slots; on a failed second write the access slot is put
    /// back to `previous_access` so the store never holds a mixed pair.
    fn persist(
        &self,
        previous_access: Option<&str>,
        access: &str,
        refresh: Option<&str>,
    ) -> Result<(), StoreError> {
        self.store.save(Slot::AccessToken, access)?;
        let result = match refresh {
            Some(refresh) => self.store.save(Slot::RefreshToken, refresh),
            None => self.store.remove(Slot::RefreshToken),
        };
        if let Err(err) = result {
            let rollback = match previous_access {
                Some(previous) => self.store.save(Slot::AccessToken, previous),
                None => self.store.remove(Slot::AccessToken),
            };
            if let Err(rollback_err) = rollback {
                warn!(error = %rollback_err, "failed to roll back stored access token");
            }
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::store::MemoryStore;
    use crate::transport::{MockTransport, TransportResponse};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    const BASE: &str = "http://localhost:3000/api";

    /// Store whose refresh slot refuses writes.
    #[derive(Default)]
    struct BrokenRefreshSlot {
        inner: MemoryStore,
    }

    impl CredentialStore for BrokenRefreshSlot {
        fn load(&self, slot: Slot) -> Result<Option<String>, StoreError> {
            self.inner.load(slot)
        }

        fn save(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
            if slot == Slot::RefreshToken {
                return Err(StoreError::Backend("read-only".to_string()));
            }
            self.inner.save(slot, value)
        }

        fn remove(&self, slot: Slot) -> Result<(), StoreError> {
            self.inner.remove(slot)
        }
    }

    /// Holds every response until `release` fires, signalling `entered`
    /// once the request is in flight.
    struct GatedTransport {
        reply: TransportResponse,
        entered: Notify,
        release: Notify,
    }

    impl GatedTransport {
        fn new(status: u16, body: serde_json::Value) -> Self {
            Self {
                reply: TransportResponse::json(status, &body),
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn send(
            &self,
            _request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.reply.clone())
        }
    }

    fn manager(store: Arc<dyn CredentialStore>, transport: Arc<dyn Transport>) -> CredentialManager {
        CredentialManager::load(store, transport, BASE).expect("manager")
    }

    #[test]
    fn login_persists_and_reload_restores() {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(MockTransport::new());
        let first = manager(store.clone(), transport.clone());
        assert_eq!(first.state(), AuthState::Anonymous);

        first.set_from_login("T1", Some("R1")).expect("login");
        assert_eq!(first.state(), AuthState::Authenticated);

        let second = manager(store, transport);
        assert_eq!(second.access().as_deref(), Some("T1"));
        assert_eq!(second.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn access_only_login_drops_old_refresh_token() {
        let store = Arc::new(MemoryStore::seeded("T0", Some("R0")));
        let creds = manager(store.clone(), Arc::new(MockTransport::new()));
        creds.set_from_login("T1", None).expect("login");
        assert_eq!(creds.refresh_token(), None);
        assert_eq!(store.load(Slot::RefreshToken).expect("load"), None);
    }

    #[test]
    fn failed_persist_leaves_state_and_store_untouched() {
        let store = Arc::new(BrokenRefreshSlot::default());
        store.inner.save(Slot::AccessToken, "T0").expect("seed");
        let creds = manager(store.clone(), Arc::new(MockTransport::new()));

        let result = creds.set_from_login("T1", Some("R1"));
        assert!(matches!(result, Err(ClientError::Storage(_))));
        assert_eq!(creds.access().as_deref(), Some("T0"));
        assert_eq!(
            store.load(Slot::AccessToken).expect("load").as_deref(),
            Some("T0")
        );
    }

    #[tokio::test]
    async fn refresh_replaces_access_and_rotates_refresh() {
        let transport = Arc::new(MockTransport::new());
        transport.route(
            Method::POST,
            endpoints::AUTH_REFRESH,
            200,
            json!({ "token": "T2", "refreshToken": "R2" }),
        );
        let store = Arc::new(MemoryStore::seeded("T1", Some("R1")));
        let creds = manager(store.clone(), transport.clone());

        assert!(creds.refresh().await);
        assert_eq!(creds.access().as_deref(), Some("T2"));
        assert_eq!(creds.refresh_token().as_deref(), Some("R2"));
        assert_eq!(store.load(Slot::AccessToken).expect("load").as_deref(), Some("T2"));

        let sent = transport.requests_to(endpoints::AUTH_REFRESH);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].json_body(), Some(json!({ "refreshToken": "R1" })));
        assert_eq!(sent[0].header("authorization"), None);
    }

    #[tokio::test]
    async fn refresh_failures_do_not_mutate_state() {
        let cases = [
            (400, json!({ "message": "invalid refresh token" })),
            (200, json!({ "refreshToken": "R9" })),
            (200, json!({ "token": "" })),
        ];
        for (status, body) in cases {
            let transport = Arc::new(MockTransport::new());
            transport.route(Method::POST, endpoints::AUTH_REFRESH, status, body);
            let store = Arc::new(MemoryStore::seeded("T1", Some("R1")));
            let creds = manager(store, transport);

            assert!(!creds.refresh().await);
            assert_eq!(creds.access().as_deref(), Some("T1"));
            assert_eq!(creds.refresh_token().as_deref(), Some("R1"));
        }
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_without_network() {
        let transport = Arc::new(MockTransport::new());
        let creds = manager(Arc::new(MemoryStore::seeded("T1", None)), transport.clone());
        assert!(!creds.refresh().await);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn refresh_survives_network_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.route_network_error(Method::POST, endpoints::AUTH_REFRESH);
        let creds = manager(Arc::new(MemoryStore::seeded("T1", Some("R1"))), transport);
        assert!(!creds.refresh().await);
        assert_eq!(creds.access().as_deref(), Some("T1"));
    }

    #[test]
    fn clear_is_idempotent() {
        let store = Arc::new(MemoryStore::seeded("T1", Some("R1")));
        let creds = manager(store.clone(), Arc::new(MockTransport::new()));
        creds.clear();
        creds.clear();
        assert_eq!(creds.state(), AuthState::Anonymous);
        assert_eq!(creds.refresh_token(), None);
        assert_eq!(store.load(Slot::AccessToken).expect("load"), None);
        assert_eq!(store.load(Slot::RefreshToken).expect("load"), None);
    }

    #[tokio::test]
    async fn rejected_refresh_keeps_pair_replaced_mid_flight() {
        let transport = Arc::new(GatedTransport::new(
            401,
            json!({ "message": "refresh token already used" }),
        ));
        let store = Arc::new(MemoryStore::seeded("T1", Some("R1")));
        let creds = manager(store.clone(), transport.clone());

        let (refreshed, ()) = tokio::join!(creds.refresh(), async {
            transport.entered.notified().await;
            creds.set_from_login("T2", Some("R2")).expect("login");
            transport.release.notify_one();
        });

        assert!(refreshed);
        assert_eq!(creds.access().as_deref(), Some("T2"));
        assert_eq!(creds.refresh_token().as_deref(), Some("R2"));
        assert_eq!(store.load(Slot::RefreshToken).expect("load").as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn successful_refresh_does_not_overwrite_newer_pair() {
        let transport = Arc::new(GatedTransport::new(
            200,
            json!({ "token": "T-late", "refreshToken": "R-late" }),
        ));
        let creds = manager(Arc::new(MemoryStore::seeded("T1", Some("R1"))), transport.clone());

        let (refreshed, ()) = tokio::join!(creds.refresh(), async {
            transport.entered.notified().await;
            creds.set_from_login("T2", Some("R2")).expect("login");
            transport.release.notify_one();
        });

        assert!(refreshed);
        assert_eq!(creds.access().as_deref(), Some("T2"));
        assert_eq!(creds.refresh_token().as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn refresh_reports_failure_when_cleared_mid_flight() {
        let transport = Arc::new(GatedTransport::new(
            200,
            json!({ "token": "T2", "refreshToken": "R2" }),
        ));
        let store = Arc::new(MemoryStore::seeded("T1", Some("R1")));
        let creds = manager(store.clone(), transport.clone());

        let (refreshed, ()) = tokio::join!(creds.refresh(), async {
            transport.entered.notified().await;
            creds.clear();
            transport.release.notify_one();
        });

        assert!(!refreshed);
        assert_eq!(creds.state(), AuthState::Anonymous);
        assert_eq!(store.load(Slot::AccessToken).expect("load"), None);
        assert_eq!(store.load(Slot::RefreshToken).expect("load"), None);
    }
}
