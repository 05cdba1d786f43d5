use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vpnhub_client::ApiClient;

#[derive(Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(default)]
    pub current_context: Option<String>,
    #[serde(default)]
    pub contexts: HashMap<String, CliContext>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CliContext {
    pub addr: String,
    #[serde(default)]
    pub credential_store: CredentialBackend,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub logged_in_at: Option<String>,
}

/// Where a context keeps its access and refresh tokens.
#[derive(Serialize, Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    Keyring,
    File,
}

impl std::str::FromStr for CredentialBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => anyhow::bail!("unknown credential store: {other} (expected keyring or file)"),
        }
    }
}

pub struct CommandContext<'a> {
    pub client: &'a ApiClient,
    pub addr: &'a str,
    pub context_name: String,
    pub config: &'a mut CliConfig,
}
