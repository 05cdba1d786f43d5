use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::credentials::CredentialManager;
use crate::error::{error_message, ClientError};
use crate::request::{join_url, set_header, ApiRequest};
use crate::store::CredentialStore;
use crate::transport::{build_transport, Transport, TransportRequest, TransportResponse};

const UNAUTHORIZED: u16 = 401;

/// Request dispatcher with transparent re-authentication.
///
/// Built explicitly and passed to whoever needs it; there is no process-wide
/// instance.
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: CredentialManager,
}

impl ApiClient {
    /// Builds a client whose transport is chosen by `config.mode`.
    pub fn new(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self, ClientError> {
        let transport = build_transport(config)?;
        Self::with_transport(&config.base_url, transport, store)
    }

    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        let credentials = CredentialManager::load(store, transport.clone(), base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            credentials,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Performs one logical call and returns the parsed JSON body.
    ///
    /// A 401 while a refresh token is held triggers exactly one refresh and
    /// one resend of the original request; a 401 on the resend is returned
    /// as [`ClientError::Http`]. A 401 without a refresh token, or a failed
    /// refresh, clears all credentials and fails with
    /// [`ClientError::AuthenticationFailed`]. Requests built with
    /// [`ApiRequest::without_reauth`] skip all of this.
    pub async fn request(&self, request: ApiRequest) -> Result<serde_json::Value, ClientError> {
        let url = join_url(&self.base_url, &request.endpoint);
        let body = match &request.body {
            Some(body) => Some(
                serde_json::to_vec(body)
                    .map_err(|err| ClientError::InvalidRequest(err.to_string()))?,
            ),
            None => None,
        };

        let mut response = self.send_once(&request, &url, body.clone()).await?;
        if response.status == UNAUTHORIZED && request.reauthenticate {
            info!(
                method = %request.method,
                url = %url,
                "http request unauthorized; attempting token refresh"
            );
            if self.credentials.refresh_token().is_none() {
                self.credentials.clear();
                let message = error_message(response.status, &response.body);
                return Err(ClientError::AuthenticationFailed(message));
            }
            if !self.credentials.refresh().await {
                self.credentials.clear();
                return Err(ClientError::AuthenticationFailed(
                    "session expired; token refresh failed".to_string(),
                ));
            }
            response = self.send_once(&request, &url, body).await?;
        }

        parse_response(response)
    }

    /// [`request`](Self::request), deserialized into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let value = self.request(request).await?;
        serde_json::from_value(value).map_err(|err| ClientError::ResponseFormat(err.to_string()))
    }

    async fn send_once(
        &self,
        request: &ApiRequest,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<TransportResponse, ClientError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        for (name, value) in &request.headers {
            set_header(&mut headers, name, value.clone());
        }
        if let Some(token) = self.credentials.access() {
            set_header(&mut headers, "Authorization", format!("Bearer {token}"));
        }

        let outgoing = TransportRequest {
            method: request.method.clone(),
            url: url.to_string(),
            headers,
            body,
        };
        debug!(method = %request.method, url = %url, "http request");
        let start = Instant::now();
        let response = self.transport.send(outgoing).await?;
        debug!(
            method = %request.method,
            url = %url,
            status = response.status,
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        Ok(response)
    }
}

fn parse_response(response: TransportResponse) -> Result<serde_json::Value, ClientError> {
    if !response.is_success() {
        return Err(ClientError::http(response.status, &response.body));
    }
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_slice(&response.body)
        .map_err(|err| ClientError::ResponseFormat(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_success_body_is_null() {
        let value = parse_response(TransportResponse::new(204, "")).expect("parse");
        assert!(value.is_null());
    }

    #[test]
    fn malformed_success_body_is_format_error() {
        let result = parse_response(TransportResponse::new(200, "{\"invoices\": ["));
        assert!(matches!(result, Err(ClientError::ResponseFormat(_))));
    }

    #[test]
    fn error_status_carries_server_message() {
        let result = parse_response(TransportResponse::new(
            409,
            r#"{"message":"Already connected"}"#,
        ));
        match result {
            Err(ClientError::Http { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Already connected");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
