use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;
use vpnhub_client::{ApiClient, ApiRequest, ClientConfig, ClientError, MemoryStore};

#[tokio::test]
async fn live_transport_refreshes_and_retries() {
    let mut server = Server::new_async().await;
    let expired = server
        .mock("GET", "/api/user/profile")
        .match_header("authorization", "Bearer T1")
        .with_status(401)
        .with_body(json!({ "message": "Token expired" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/api/auth/refresh")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "refreshToken": "R1" })))
        .with_status(200)
        .with_body(json!({ "token": "T2" }).to_string())
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("GET", "/api/user/profile")
        .match_header("authorization", "Bearer T2")
        .with_status(200)
        .with_body(json!({ "user": { "id": 1, "email": "a@b.com" } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let config = ClientConfig::new(format!("{}/api", server.url()));
    let client = ApiClient::new(&config, Arc::new(MemoryStore::seeded("T1", Some("R1"))))
        .expect("client");
    let profile = client.profile().await.expect("profile");

    assert_eq!(profile.email, "a@b.com");
    expired.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;
}

#[tokio::test]
async fn live_transport_forwards_method_and_body() {
    let mut server = Server::new_async().await;
    let connect = server
        .mock("POST", "/api/connections")
        .match_header("authorization", "Bearer T1")
        .match_body(Matcher::Json(json!({ "serverId": 2, "protocol": "wireguard" })))
        .with_status(201)
        .with_body(
            json!({
                "connection": { "id": 5, "serverId": 2, "status": "connecting" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = ClientConfig::new(format!("{}/api/", server.url()));
    let client =
        ApiClient::new(&config, Arc::new(MemoryStore::seeded("T1", None))).expect("client");
    let connection = client.connect(2, Some("wireguard")).await.expect("connect");

    assert_eq!(connection.id, 5);
    connect.assert_async().await;
}

#[tokio::test]
async fn live_transport_sends_put_with_caller_headers() {
    let mut server = Server::new_async().await;
    let rename = server
        .mock("PUT", "/api/devices/11")
        .match_header("authorization", "Bearer T1")
        .match_header("if-match", "v3")
        .match_body(Matcher::Json(json!({ "name": "work laptop" })))
        .with_status(200)
        .with_body(json!({ "device": { "id": 11, "name": "work laptop" } }).to_string())
        .create_async()
        .await;

    let config = ClientConfig::new(format!("{}/api", server.url()));
    let client =
        ApiClient::new(&config, Arc::new(MemoryStore::seeded("T1", None))).expect("client");
    let value = client
        .request(
            ApiRequest::put("/devices/11")
                .with_body(json!({ "name": "work laptop" }))
                .with_header("If-Match", "v3"),
        )
        .await
        .expect("put");

    assert_eq!(value["device"]["name"], "work laptop");
    rename.assert_async().await;
}

#[tokio::test]
async fn live_transport_reports_refused_connections() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let config = ClientConfig::new(format!("http://{addr}/api"));
    let client = ApiClient::new(&config, Arc::new(MemoryStore::new())).expect("client");
    let err = client
        .request(ApiRequest::get("/servers"))
        .await
        .expect_err("refused");

    assert!(matches!(err, ClientError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn live_transport_rejects_invalid_headers_before_sending() {
    let config = ClientConfig::new("http://127.0.0.1:9/api");
    let client = ApiClient::new(&config, Arc::new(MemoryStore::new())).expect("client");
    let err = client
        .request(ApiRequest::get("/servers").with_header("bad header", "x"))
        .await
        .expect_err("invalid header");

    assert!(matches!(err, ClientError::InvalidRequest(_)), "{err:?}");
}
