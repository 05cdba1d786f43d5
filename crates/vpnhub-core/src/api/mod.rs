pub mod auth;
pub mod billing;
pub mod connections;

pub use auth::*;
pub use billing::*;
pub use connections::*;

use serde::{Deserialize, Serialize};

/// Error body returned by the API for any non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}
