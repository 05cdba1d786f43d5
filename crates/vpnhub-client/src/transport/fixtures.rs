use reqwest::Method;
use serde_json::{json, Value};
use vpnhub_core::endpoints;

use super::MockTransport;

const MOCK_ACCESS_TOKEN: &str = "mock-access-token";
const MOCK_REFRESH_TOKEN: &str = "mock-refresh-token";

fn demo_user() -> Value {
    json!({
        "id": 1,
        "email": "demo@vpnhub.test",
        "name": "Demo User",
        "role": "user",
        "createdAt": "2024-01-15T09:30:00Z"
    })
}

fn demo_servers() -> Value {
    json!([
        {
            "id": 1,
            "name": "us-east-1",
            "country": "US",
            "city": "New York",
            "status": "online",
            "load": 42,
            "protocols": ["wireguard", "openvpn"]
        },
        {
            "id": 2,
            "name": "de-fra-1",
            "country": "DE",
            "city": "Frankfurt",
            "status": "online",
            "load": 17,
            "protocols": ["wireguard"]
        },
        {
            "id": 3,
            "name": "jp-tyo-1",
            "country": "JP",
            "city": "Tokyo",
            "status": "maintenance",
            "load": null,
            "protocols": ["openvpn"]
        }
    ])
}

fn demo_connection() -> Value {
    json!({
        "id": 101,
        "serverId": 1,
        "status": "connected",
        "protocol": "wireguard",
        "assignedIp": "10.8.0.12",
        "connectedAt": "2024-06-01T12:00:00Z"
    })
}

pub(super) fn install(transport: &MockTransport) {
    let auth = json!({
        "token": MOCK_ACCESS_TOKEN,
        "refreshToken": MOCK_REFRESH_TOKEN,
        "user": demo_user()
    });
    transport.route(Method::POST, endpoints::AUTH_LOGIN, 200, auth.clone());
    transport.route(Method::POST, endpoints::AUTH_REGISTER, 201, auth);
    transport.route(
        Method::POST,
        endpoints::AUTH_REFRESH,
        200,
        json!({ "token": MOCK_ACCESS_TOKEN }),
    );
    transport.route(
        Method::POST,
        endpoints::AUTH_LOGOUT,
        200,
        json!({ "message": "Logged out" }),
    );
    transport.route(
        Method::GET,
        endpoints::USER_PROFILE,
        200,
        json!({ "user": demo_user() }),
    );

    let servers = demo_servers();
    transport.route(
        Method::GET,
        endpoints::SERVERS,
        200,
        json!({ "servers": servers }),
    );
    if let Value::Array(list) = servers {
        for server in list {
            let Some(id) = server.get("id").and_then(Value::as_i64) else {
                continue;
            };
            transport.route(
                Method::GET,
                &endpoints::item(endpoints::SERVERS, id),
                200,
                json!({ "server": server }),
            );
        }
    }

    transport.route(
        Method::POST,
        endpoints::CONNECTIONS,
        201,
        json!({ "connection": demo_connection() }),
    );
    transport.route(
        Method::GET,
        endpoints::CONNECTIONS_CURRENT,
        200,
        json!({ "connection": demo_connection() }),
    );
    transport.route(
        Method::DELETE,
        &format!("{}/*", endpoints::CONNECTIONS),
        200,
        json!({ "message": "Disconnected" }),
    );

    transport.route(
        Method::GET,
        endpoints::BILLING_PLANS,
        200,
        json!({
            "plans": [
                {
                    "id": "basic-monthly",
                    "name": "Basic",
                    "priceCents": 499,
                    "currency": "USD",
                    "interval": "month",
                    "maxDevices": 1
                },
                {
                    "id": "premium-yearly",
                    "name": "Premium",
                    "priceCents": 5999,
                    "currency": "USD",
                    "interval": "year",
                    "maxDevices": 5
                }
            ]
        }),
    );
    let subscription = json!({
        "planId": "premium-yearly",
        "status": "active",
        "currentPeriodEnd": "2025-06-01T00:00:00Z"
    });
    transport.route(
        Method::GET,
        endpoints::BILLING_SUBSCRIPTION,
        200,
        json!({ "subscription": subscription }),
    );
    transport.route(
        Method::POST,
        endpoints::BILLING_SUBSCRIBE,
        200,
        json!({ "subscription": subscription }),
    );
    transport.route(
        Method::POST,
        endpoints::BILLING_CANCEL,
        200,
        json!({
            "subscription": {
                "planId": "premium-yearly",
                "status": "cancelled",
                "currentPeriodEnd": "2025-06-01T00:00:00Z"
            }
        }),
    );
    transport.route(
        Method::GET,
        endpoints::BILLING_INVOICES,
        200,
        json!({
            "invoices": [
                {
                    "id": "inv_0001",
                    "amountCents": 5999,
                    "currency": "USD",
                    "status": "paid",
                    "issuedAt": "2024-06-01T00:00:00Z"
                }
            ]
        }),
    );

    transport.route(
        Method::GET,
        endpoints::DEVICES,
        200,
        json!({
            "devices": [
                {
                    "id": 11,
                    "name": "laptop",
                    "platform": "linux",
                    "lastSeenAt": "2024-06-01T11:58:00Z"
                },
                {
                    "id": 12,
                    "name": "phone",
                    "platform": "android",
                    "lastSeenAt": null
                }
            ]
        }),
    );
    transport.route(
        Method::DELETE,
        &format!("{}/*", endpoints::DEVICES),
        200,
        json!({ "message": "Device removed" }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Transport, TransportRequest};
    use vpnhub_core::{PlansResponse, ServerResponse, ServersResponse};

    async fn get(transport: &MockTransport, path: &str) -> Vec<u8> {
        let response = transport
            .send(TransportRequest {
                method: Method::GET,
                url: format!("http://localhost:3000/api{path}"),
                headers: Vec::new(),
                body: None,
            })
            .await
            .expect("send");
        assert_eq!(response.status, 200, "GET {path}");
        response.body
    }

    #[tokio::test]
    async fn fixtures_deserialize_into_core_models() {
        let transport = MockTransport::with_fixtures();

        let servers: ServersResponse =
            serde_json::from_slice(&get(&transport, "/servers").await).expect("servers");
        assert_eq!(servers.servers.len(), 3);

        let server: ServerResponse =
            serde_json::from_slice(&get(&transport, "/servers/2").await).expect("server");
        assert_eq!(server.server.name, "de-fra-1");

        let plans: PlansResponse =
            serde_json::from_slice(&get(&transport, "/billing/plans").await).expect("plans");
        assert_eq!(plans.plans.len(), 2);
    }
}
