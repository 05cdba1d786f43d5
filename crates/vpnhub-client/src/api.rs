//! Typed wrappers over the platform endpoints.

use tracing::{info, warn};
use vpnhub_core::{
    endpoints, AuthResponse, ConnectRequest, Connection, ConnectionResponse, Device,
    DevicesResponse, Invoice, InvoicesResponse, LoginRequest, LogoutRequest, Plan, PlansResponse,
    ProfileResponse, RegisterRequest, ServerResponse, ServersResponse, SubscribeRequest,
    Subscription, SubscriptionResponse, UserProfile, VpnServer,
};

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::request::ApiRequest;

impl ApiClient {
    /// Logs in and stores the issued credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self
            .request_as(
                ApiRequest::post(endpoints::AUTH_LOGIN)
                    .with_json(&payload)?
                    .without_reauth(),
            )
            .await?;
        self.accept_auth(&auth)?;
        Ok(auth)
    }

    /// Creates an account; the server logs the new user in directly.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthResponse, ClientError> {
        let payload = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        };
        let auth: AuthResponse = self
            .request_as(
                ApiRequest::post(endpoints::AUTH_REGISTER)
                    .with_json(&payload)?
                    .without_reauth(),
            )
            .await?;
        self.accept_auth(&auth)?;
        Ok(auth)
    }

    fn accept_auth(&self, auth: &AuthResponse) -> Result<(), ClientError> {
        if auth.token.is_empty() {
            return Err(ClientError::ResponseFormat(
                "auth response has no token".to_string(),
            ));
        }
        self.credentials()
            .set_from_login(&auth.token, auth.refresh_token.as_deref())
    }

    /// Notifies the server, then clears local credentials regardless of the
    /// outcome of that notification.
    pub async fn logout(&self) {
        let payload = LogoutRequest {
            refresh_token: self.credentials().refresh_token(),
        };
        let notified = match ApiRequest::post(endpoints::AUTH_LOGOUT).with_json(&payload) {
            Ok(request) => self.request(request).await.map(|_| ()),
            Err(err) => Err(err),
        };
        if let Err(err) = notified {
            warn!(error = %err, "logout notification failed; clearing local credentials");
        }
        self.credentials().clear();
        info!("logged out");
    }

    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let response: ProfileResponse = self
            .request_as(ApiRequest::get(endpoints::USER_PROFILE))
            .await?;
        Ok(response.user)
    }

    pub async fn servers(&self) -> Result<Vec<VpnServer>, ClientError> {
        let response: ServersResponse = self.request_as(ApiRequest::get(endpoints::SERVERS)).await?;
        Ok(response.servers)
    }

    pub async fn server(&self, id: i64) -> Result<VpnServer, ClientError> {
        let response: ServerResponse = self
            .request_as(ApiRequest::get(endpoints::item(endpoints::SERVERS, id)))
            .await?;
        Ok(response.server)
    }

    /// Records a new connection to `server_id`. No tunnel is established.
    pub async fn connect(
        &self,
        server_id: i64,
        protocol: Option<&str>,
    ) -> Result<Connection, ClientError> {
        let payload = ConnectRequest {
            server_id,
            protocol: protocol.map(str::to_string),
        };
        let response: ConnectionResponse = self
            .request_as(ApiRequest::post(endpoints::CONNECTIONS).with_json(&payload)?)
            .await?;
        response.connection.ok_or_else(|| {
            ClientError::ResponseFormat("connect response has no connection".to_string())
        })
    }

    pub async fn disconnect(&self, connection_id: i64) -> Result<(), ClientError> {
        self.request(ApiRequest::delete(endpoints::item(
            endpoints::CONNECTIONS,
            connection_id,
        )))
        .await?;
        Ok(())
    }

    pub async fn current_connection(&self) -> Result<Option<Connection>, ClientError> {
        let response: ConnectionResponse = self
            .request_as(ApiRequest::get(endpoints::CONNECTIONS_CURRENT))
            .await?;
        Ok(response.connection)
    }

    pub async fn plans(&self) -> Result<Vec<Plan>, ClientError> {
        let response: PlansResponse = self
            .request_as(ApiRequest::get(endpoints::BILLING_PLANS))
            .await?;
        Ok(response.plans)
    }

    pub async fn subscription(&self) -> Result<Option<Subscription>, ClientError> {
        let response: SubscriptionResponse = self
            .request_as(ApiRequest::get(endpoints::BILLING_SUBSCRIPTION))
            .await?;
        Ok(response.subscription)
    }

    pub async fn subscribe(&self, plan_id: &str) -> Result<Option<Subscription>, ClientError> {
        let payload = SubscribeRequest {
            plan_id: plan_id.to_string(),
        };
        let response: SubscriptionResponse = self
            .request_as(ApiRequest::post(endpoints::BILLING_SUBSCRIBE).with_json(&payload)?)
            .await?;
        Ok(response.subscription)
    }

    pub async fn cancel_subscription(&self) -> Result<Option<Subscription>, ClientError> {
        let response: SubscriptionResponse = self
            .request_as(ApiRequest::post(endpoints::BILLING_CANCEL))
            .await?;
        Ok(response.subscription)
    }

    pub async fn invoices(&self) -> Result<Vec<Invoice>, ClientError> {
        let response: InvoicesResponse = self
            .request_as(ApiRequest::get(endpoints::BILLING_INVOICES))
            .await?;
        Ok(response.invoices)
    }

    pub async fn devices(&self) -> Result<Vec<Device>, ClientError> {
        let response: DevicesResponse = self.request_as(ApiRequest::get(endpoints::DEVICES)).await?;
        Ok(response.devices)
    }

    pub async fn remove_device(&self, device_id: i64) -> Result<(), ClientError> {
        self.request(ApiRequest::delete(endpoints::item(
            endpoints::DEVICES,
            device_id,
        )))
        .await?;
        Ok(())
    }
}
