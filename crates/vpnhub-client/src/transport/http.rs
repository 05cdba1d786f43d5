use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{Transport, TransportRequest, TransportResponse};
use crate::config::ClientConfig;
use crate::error::TransportError;

/// Live transport backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|err| TransportError::InvalidRequest(format!("http client: {err}")))?;
        Ok(Self { client })
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidRequest(format!("invalid header name: {name}")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            TransportError::InvalidRequest(format!("invalid value for header {name}"))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Connect(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let headers = header_map(&request.headers)?;
        let builder = self
            .client
            .request(request.method, &request.url)
            .headers(headers);
        let builder = match request.body {
            Some(body) => builder.body(body),
            None => builder,
        };
        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_rejects_invalid_names() {
        let headers = vec![("bad header".to_string(), "x".to_string())];
        assert!(matches!(
            header_map(&headers),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[test]
    fn header_map_rejects_control_characters() {
        let headers = vec![("x-note".to_string(), "line\nbreak".to_string())];
        assert!(header_map(&headers).is_err());
    }
}
