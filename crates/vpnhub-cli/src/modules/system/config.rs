use std::fs;
use std::path::{Path, PathBuf};

use super::types::{CliConfig, CliContext, CredentialBackend};
use crate::cli_args::{ConfigArgs, ConfigCommand};
use crate::modules::auth::forget_credentials;
use vpnhub_core::DEFAULT_BASE_URL;

pub(crate) fn handle_config_command(
    args: ConfigArgs,
    config: &mut CliConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::SetContext(args) => {
            let entry = config
                .contexts
                .entry(args.name.clone())
                .or_insert_with(|| CliContext {
                    addr: DEFAULT_BASE_URL.to_string(),
                    credential_store: CredentialBackend::default(),
                    email: None,
                    logged_in_at: None,
                });
            if let Some(addr) = args.addr {
                entry.addr = addr;
            }
            if let Some(backend) = args.credential_store {
                entry.credential_store = backend;
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::UseContext(args) => {
            if !config.contexts.contains_key(&args.name) {
                anyhow::bail!("context not found: {}", args.name);
            }
            config.current_context = Some(args.name);
        }
        ConfigCommand::CurrentContext => {
            if let Some(current) = config.current_context.clone() {
                println!("{current}");
            }
        }
        ConfigCommand::GetContexts => {
            let mut names: Vec<_> = config.contexts.keys().cloned().collect();
            names.sort();
            for name in names {
                let marker = if config.current_context.as_ref() == Some(&name) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {name}");
            }
        }
        ConfigCommand::DeleteContext(args) => {
            let Some(context) = config.contexts.remove(&args.name) else {
                anyhow::bail!("context not found: {}", args.name);
            };
            forget_credentials(&args.name, Some(&context))?;
            if config.current_context.as_deref() == Some(&args.name) {
                config.current_context = None;
            }
        }
    }
    Ok(())
}

pub(crate) fn config_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("HOME is not set"))?;
    Ok(Path::new(&home).join(".vpnhub"))
}

fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub(crate) fn load_config() -> anyhow::Result<CliConfig> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let contents = fs::read_to_string(&path)?;
    let config = serde_json::from_str(&contents)
        .map_err(|err| anyhow::anyhow!("invalid config {}: {err}", path.display()))?;
    Ok(config)
}

pub(crate) fn save_config(config: &CliConfig) -> anyhow::Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Plain http is only allowed for loopback development servers unless the
/// user passes `--insecure`.
pub(crate) fn ensure_secure_addr(addr: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if !addr.starts_with("http://") || allow_insecure || is_loopback(addr) {
        return Ok(());
    }
    anyhow::bail!("refusing to use http:// without --insecure");
}

fn is_loopback(addr: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(addr) else {
        return false;
    };
    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    )
}
