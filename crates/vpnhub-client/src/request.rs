use reqwest::Method;
use serde::Serialize;

use crate::error::ClientError;

/// One logical API call: endpoint relative to the base address, method,
/// optional JSON body and header overrides.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// Whether a 401 answer goes through the refresh-and-retry path.
    pub reauthenticate: bool,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: Vec::new(),
            reauthenticate: true,
        }
    }

    #[must_use]
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    #[must_use]
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    #[must_use]
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    #[must_use]
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_json<T: Serialize>(self, payload: &T) -> Result<Self, ClientError> {
        let body = serde_json::to_value(payload)
            .map_err(|err| ClientError::InvalidRequest(format!("unserializable body: {err}")))?;
        Ok(self.with_body(body))
    }

    /// Returns a 401 answer as [`ClientError::Http`] without refreshing or
    /// clearing the held credentials. Used for calls that establish a
    /// session, where a 401 means rejected credentials.
    #[must_use]
    pub fn without_reauth(mut self) -> Self {
        self.reauthenticate = false;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Joins the configured base address and a server-relative endpoint.
#[must_use]
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    if endpoint.is_empty() {
        return base.to_string();
    }
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}

/// Sets `name` to `value`, replacing any existing header with the same
/// case-insensitive name.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(
            join_url("http://localhost:3000/api", "/user/profile"),
            "http://localhost:3000/api/user/profile"
        );
        assert_eq!(
            join_url("http://localhost:3000/api/", "servers"),
            "http://localhost:3000/api/servers"
        );
        assert_eq!(
            join_url("http://localhost:3000/api/", ""),
            "http://localhost:3000/api"
        );
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        set_header(&mut headers, "content-type", "text/plain".to_string());
        assert_eq!(
            headers,
            vec![("content-type".to_string(), "text/plain".to_string())]
        );
    }
}
