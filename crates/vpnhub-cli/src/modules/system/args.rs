use clap::{Args, Subcommand};

use super::types::CredentialBackend;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Create or update a context")]
    SetContext(SetContextArgs),
    #[command(about = "Set the active context")]
    UseContext(UseContextArgs),
    #[command(about = "Print the active context name")]
    CurrentContext,
    #[command(about = "List known context names")]
    GetContexts,
    #[command(about = "Remove a context and its stored credentials")]
    DeleteContext(DeleteContextArgs),
}

#[derive(Args)]
pub struct SetContextArgs {
    #[arg(help = "Context name")]
    pub name: String,
    #[arg(long, help = "API base URL")]
    pub addr: Option<String>,
    #[arg(long, value_enum, help = "Credential storage backend")]
    pub credential_store: Option<CredentialBackend>,
}

#[derive(Args)]
pub struct UseContextArgs {
    #[arg(help = "Context name")]
    pub name: String,
}

#[derive(Args)]
pub struct DeleteContextArgs {
    #[arg(help = "Context name")]
    pub name: String,
}
