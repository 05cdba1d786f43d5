use clap::Parser;
use std::io::{self, Write};
use std::time::Duration;

use vpnhub_client::{ApiClient, ClientConfig, ClientError, ClientMode};
use vpnhub_core::DEFAULT_BASE_URL;

mod cli_args;
mod cli_command;
mod modules;

use crate::cli_args::*;
use crate::cli_command::handle_command;
use crate::modules::auth::open_credential_store;
use crate::modules::system::CommandContext;
use crate::modules::system::{ensure_secure_addr, handle_config_command, load_config, save_config};
use tracing_subscriber::EnvFilter;

pub(crate) const DEFAULT_CONTEXT: &str = "default";
pub(crate) const CREDENTIAL_STORE_ENV: &str = "VPNHUB_CREDENTIAL_STORE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let mut config = load_config()?;

    match cli.command {
        Command::Config(args) => {
            handle_config_command(args, &mut config)?;
            save_config(&config)?;
        }
        command => {
            let context_name = cli
                .context
                .clone()
                .or_else(|| config.current_context.clone())
                .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());
            let context = config.contexts.get(&context_name).cloned();
            let addr = cli
                .addr
                .clone()
                .or_else(|| context.as_ref().map(|ctx| ctx.addr.clone()))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
            let mode = if cli.mock {
                ClientMode::Mock
            } else {
                ensure_secure_addr(&addr, cli.insecure)?;
                ClientMode::Live
            };

            let store = open_credential_store(
                cli.token.as_deref(),
                cli.mock,
                &context_name,
                context.as_ref(),
            )?;
            let client_config = ClientConfig::new(addr.clone())
                .with_mode(mode)
                .with_timeout(Duration::from_secs(cli.timeout))
                .accept_invalid_certs(cli.insecure);
            let client = ApiClient::new(&client_config, store)?;

            let mut ctx = CommandContext {
                client: &client,
                addr: &addr,
                context_name,
                config: &mut config,
            };
            let result = handle_command(command, &mut ctx).await;
            save_config(ctx.config)?;
            result.map_err(explain_error)?;
        }
    }

    Ok(())
}

/// Adds a hint telling the user what to do about API failures.
pub(crate) fn explain_error(err: anyhow::Error) -> anyhow::Error {
    let hint = match err.downcast_ref::<ClientError>() {
        Some(client_err) if client_err.is_auth_failure() => {
            "session expired or credentials rejected; run `vpnhub login`"
        }
        Some(client_err) if client_err.is_retryable() => "temporary failure; try again",
        _ => return err,
    };
    err.context(hint)
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) if !filter.trim().is_empty() => EnvFilter::try_new(filter)?,
        _ => {
            let level = match verbosity {
                0 => "warn",
                1 => "info",
                _ => "debug",
            };
            EnvFilter::try_new(level)?
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

pub(crate) fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut input = String::new();
    print!("{prompt}");
    io::stdout().flush()?;
    io::stdin().read_line(&mut input)?;
    let input = input.trim().to_string();
    if input.is_empty() {
        anyhow::bail!("{} is required", prompt.trim_end_matches([':', ' ']));
    }
    Ok(input)
}

pub(crate) fn prompt_password(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let password = rpassword::read_password()?;
    if password.trim().is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}
