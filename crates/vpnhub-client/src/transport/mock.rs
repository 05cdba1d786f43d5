use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;

use super::{fixtures, Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

enum Reply {
    Response(TransportResponse),
    Fail(String),
}

struct Route {
    method: Method,
    segments: Vec<String>,
    replies: VecDeque<Reply>,
}

impl Route {
    fn matches(&self, method: &Method, path: &str) -> bool {
        if &self.method != method {
            return false;
        }
        let path: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if path.len() < self.segments.len() {
            return false;
        }
        // Routes match the trailing segments so they are independent of the
        // base address prefix; `*` matches any single segment.
        let tail = &path[path.len() - self.segments.len()..];
        self.segments
            .iter()
            .zip(tail)
            .all(|(expected, actual)| expected == "*" || expected == actual)
    }

    /// Replies are consumed in order; the last one keeps answering.
    fn next_reply(&mut self) -> Result<TransportResponse, TransportError> {
        let consumed = if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            None
        };
        match consumed.as_ref().or(self.replies.front()) {
            Some(Reply::Response(response)) => Ok(response.clone()),
            Some(Reply::Fail(message)) => Err(TransportError::Connect(message.clone())),
            None => Err(TransportError::Connect("mock route has no reply".to_string())),
        }
    }
}

/// Transport answering from programmable routes instead of the network.
///
/// Every request is recorded so callers can inspect what would have been
/// sent. Unmatched requests get a 404 with a JSON `message`.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport preloaded with demo data for every platform endpoint.
    #[must_use]
    pub fn with_fixtures() -> Self {
        let transport = Self::new();
        fixtures::install(&transport);
        transport
    }

    /// Registers (or replaces) a route answering with `body` as JSON.
    pub fn route(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.route_replies(
            method,
            path,
            vec![Reply::Response(TransportResponse::json(status, &body))],
        );
    }

    /// Registers a route with a raw, possibly non-JSON body.
    pub fn route_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.route_replies(
            method,
            path,
            vec![Reply::Response(TransportResponse::new(status, body))],
        );
    }

    /// Registers a route answering with each response in turn.
    pub fn route_sequence(
        &self,
        method: Method,
        path: &str,
        replies: Vec<(u16, serde_json::Value)>,
    ) {
        let replies = replies
            .into_iter()
            .map(|(status, body)| Reply::Response(TransportResponse::json(status, &body)))
            .collect();
        self.route_replies(method, path, replies);
    }

    /// Registers a route whose requests fail as if the connection dropped.
    pub fn route_network_error(&self, method: Method, path: &str) {
        self.route_replies(
            method,
            path,
            vec![Reply::Fail("connection refused".to_string())],
        );
    }

    fn route_replies(&self, method: Method, path: &str, replies: Vec<Reply>) {
        let segments: Vec<String> = path
            .split('/')
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.retain(|route| !(route.method == method && route.segments == segments));
        routes.push(Route {
            method,
            segments,
            replies: replies.into(),
        });
    }

    /// Requests seen so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests whose URL path ends with `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<TransportRequest> {
        self.requests()
            .into_iter()
            .filter(|request| url_path(&request.url).ends_with(path))
            .collect()
    }
}

fn url_path(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split('?').next().unwrap_or_default().to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let path = url_path(&request.url);
        debug!(method = %request.method, path = %path, "mock request");
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        // Later registrations win so tests can override fixtures.
        match routes
            .iter_mut()
            .rev()
            .find(|route| route.matches(&request.method, &path))
        {
            Some(route) => route.next_reply(),
            None => Ok(TransportResponse::json(
                404,
                &json!({ "message": format!("no mock route for {} {}", request.method, path) }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, url: &str) -> TransportRequest {
        TransportRequest {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn routes_match_trailing_segments_and_wildcards() {
        let transport = MockTransport::new();
        transport.route(Method::GET, "/servers/*", 200, json!({ "server": 1 }));
        transport.route(Method::GET, "/servers", 200, json!({ "servers": [] }));

        let one = transport
            .send(request(Method::GET, "http://localhost/api/servers/3"))
            .await
            .expect("send");
        assert_eq!(one.status, 200);
        assert_eq!(one.body, json!({ "server": 1 }).to_string().into_bytes());

        let missing = transport
            .send(request(Method::DELETE, "http://localhost/api/servers/3"))
            .await
            .expect("send");
        assert_eq!(missing.status, 404);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(transport.requests_to("/servers/3").len(), 2);
    }

    #[tokio::test]
    async fn sequences_repeat_their_last_reply() {
        let transport = MockTransport::new();
        transport.route_sequence(
            Method::GET,
            "/ping",
            vec![(401, json!({})), (200, json!({ "ok": true }))],
        );
        let statuses = [
            transport.send(request(Method::GET, "http://h/ping")).await,
            transport.send(request(Method::GET, "http://h/ping")).await,
            transport.send(request(Method::GET, "http://h/ping")).await,
        ]
        .into_iter()
        .map(|result| result.expect("send").status)
        .collect::<Vec<_>>();
        assert_eq!(statuses, vec![401, 200, 200]);
    }

    #[tokio::test]
    async fn network_error_routes_fail_the_send() {
        let transport = MockTransport::new();
        transport.route_network_error(Method::GET, "/down");
        let result = transport.send(request(Method::GET, "http://h/down")).await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
