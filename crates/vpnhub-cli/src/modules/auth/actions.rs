use chrono::Utc;
use vpnhub_core::AuthResponse;

use crate::cli_args::*;
use super::resolve_backend;
use crate::modules::system::{CliContext, CommandContext};
use crate::{prompt_line, prompt_password};

pub(crate) async fn handle_login(
    args: LoginArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => prompt_line("Email: ")?,
    };
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };

    let auth = ctx.client.login(&email, &password).await?;
    remember_login(ctx, &auth, &email)?;
    println!("Logged in as {email}");
    Ok(())
}

pub(crate) async fn handle_register(
    args: RegisterArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password("Password: ")?,
    };

    let auth = ctx
        .client
        .register(&args.email, &password, args.name.as_deref())
        .await?;
    remember_login(ctx, &auth, &args.email)?;
    println!("Registered and logged in as {}", args.email);
    Ok(())
}

/// Records the session in the context, including the backend the tokens
/// were just written to so later runs look in the same place.
fn remember_login(
    ctx: &mut CommandContext<'_>,
    auth: &AuthResponse,
    email: &str,
) -> anyhow::Result<()> {
    let email = auth
        .user
        .as_ref()
        .map(|user| user.email.clone())
        .unwrap_or_else(|| email.to_string());
    let addr = ctx.addr.to_string();
    let backend = resolve_backend(ctx.config.contexts.get(&ctx.context_name))?;
    let entry = ctx
        .config
        .contexts
        .entry(ctx.context_name.clone())
        .or_insert_with(|| CliContext {
            addr: addr.clone(),
            credential_store: backend,
            email: None,
            logged_in_at: None,
        });
    entry.addr = addr;
    entry.credential_store = backend;
    entry.email = Some(email);
    entry.logged_in_at = Some(Utc::now().to_rfc3339());
    ctx.config.current_context = Some(ctx.context_name.clone());
    Ok(())
}

pub(crate) async fn handle_logout(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    ctx.client.logout().await;
    if let Some(context) = ctx.config.contexts.get_mut(&ctx.context_name) {
        context.logged_in_at = None;
    }
    println!("Logged out");
    Ok(())
}
