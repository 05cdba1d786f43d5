use vpnhub_core::ErrorResponse;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("{message}")]
    Http { status: u16, message: String },
    #[error("invalid response body: {0}")]
    ResponseFormat(String),
    #[error("credential storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    pub(crate) fn http(status: u16, body: &[u8]) -> Self {
        Self::Http {
            status,
            message: error_message(status, body),
        }
    }

    /// The session is gone and the user has to log in again.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Transient failures a user may simply retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Server-supplied `message` of an error body, or `HTTP <status>`.
pub(crate) fn error_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::InvalidRequest(message) => Self::InvalidRequest(message),
            other => Self::Network(other.to_string()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed credential file: {0}")]
    Format(String),
    #[error("{0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_server_message() {
        assert_eq!(
            error_message(404, br#"{"message":"Server not found"}"#),
            "Server not found"
        );
        assert_eq!(error_message(500, b"<html>oops</html>"), "HTTP 500");
        assert_eq!(error_message(400, br#"{"message":""}"#), "HTTP 400");
        assert_eq!(error_message(502, b""), "HTTP 502");
    }

    #[test]
    fn retryable_kinds() {
        assert!(ClientError::Network("refused".into()).is_retryable());
        assert!(ClientError::http(503, b"").is_retryable());
        assert!(!ClientError::http(404, b"").is_retryable());
        assert!(!ClientError::AuthenticationFailed("expired".into()).is_retryable());
        assert!(ClientError::AuthenticationFailed("expired".into()).is_auth_failure());
    }
}
