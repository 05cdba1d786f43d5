use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::config::{ClientConfig, ClientMode};
use crate::error::{ClientError, TransportError};

mod fixtures;
mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// A fully composed request as it goes over the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Builds the transport named by `config.mode`.
pub fn build_transport(config: &ClientConfig) -> Result<Arc<dyn Transport>, ClientError> {
    match config.mode {
        ClientMode::Live => Ok(Arc::new(HttpTransport::new(config)?)),
        ClientMode::Mock => Ok(Arc::new(MockTransport::with_fixtures())),
    }
}
