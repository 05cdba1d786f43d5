use crate::cli_args::*;
use crate::modules::auth::{handle_login, handle_logout, handle_register};
use crate::modules::billing::handle_billing;
use crate::modules::connections::{handle_connect, handle_disconnect, handle_status};
use crate::modules::devices::handle_devices;
use crate::modules::request::handle_request;
use crate::modules::servers::handle_servers;
use crate::modules::system::output::print_json;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_command(
    command: Command,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => handle_login(args, ctx).await?,
        Command::Register(args) => handle_register(args, ctx).await?,
        Command::Logout => handle_logout(ctx).await?,
        Command::Whoami => {
            let profile = ctx.client.profile().await?;
            print_json(&profile)?;
        }
        Command::Servers(args) => handle_servers(args, ctx).await?,
        Command::Connect(args) => handle_connect(args, ctx).await?,
        Command::Disconnect(args) => handle_disconnect(args, ctx).await?,
        Command::Status => handle_status(ctx).await?,
        Command::Billing(args) => handle_billing(args, ctx).await?,
        Command::Devices(args) => handle_devices(args, ctx).await?,
        Command::Request(args) => handle_request(args, ctx).await?,
        Command::Config(_) => unreachable!(),
    }

    Ok(())
}
