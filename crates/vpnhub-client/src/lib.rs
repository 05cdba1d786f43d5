#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! Client for the VPNHub REST API.
//!
//! [`ApiClient`] dispatches requests and transparently re-authenticates once
//! when the server answers 401. [`CredentialManager`] owns the access/refresh
//! pair and persists it through a [`CredentialStore`].

pub mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod request;
pub mod store;
pub mod transport;

pub use crate::client::ApiClient;
pub use crate::config::{ClientConfig, ClientMode};
pub use crate::credentials::{AuthState, CredentialManager};
pub use crate::error::{ClientError, StoreError, TransportError};
pub use crate::request::{join_url, ApiRequest};
pub use crate::store::{CredentialStore, FileStore, MemoryStore, Slot};
pub use crate::transport::{
    build_transport, HttpTransport, MockTransport, Transport, TransportRequest, TransportResponse,
};
