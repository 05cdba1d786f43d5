/// Base address used when neither a flag nor a config context names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

pub mod endpoints {
    pub const AUTH_LOGIN: &str = "/auth/login";
    pub const AUTH_REGISTER: &str = "/auth/register";
    pub const AUTH_REFRESH: &str = "/auth/refresh";
    pub const AUTH_LOGOUT: &str = "/auth/logout";

    pub const USER_PROFILE: &str = "/user/profile";

    pub const SERVERS: &str = "/servers";

    pub const CONNECTIONS: &str = "/connections";
    pub const CONNECTIONS_CURRENT: &str = "/connections/current";

    pub const BILLING_PLANS: &str = "/billing/plans";
    pub const BILLING_SUBSCRIPTION: &str = "/billing/subscription";
    pub const BILLING_SUBSCRIBE: &str = "/billing/subscribe";
    pub const BILLING_CANCEL: &str = "/billing/cancel";
    pub const BILLING_INVOICES: &str = "/billing/invoices";

    pub const DEVICES: &str = "/devices";

    /// Endpoint addressing a single resource under `collection`.
    #[must_use]
    pub fn item(collection: &str, id: i64) -> String {
        format!("{}/{}", collection.trim_end_matches('/'), id)
    }
}
