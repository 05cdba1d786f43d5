pub(crate) mod auth;
pub(crate) mod billing;
pub(crate) mod connections;
pub(crate) mod devices;
pub(crate) mod request;
pub(crate) mod servers;
pub(crate) mod system;
