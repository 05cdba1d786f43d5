use crate::cli_args::*;
use crate::modules::system::output::print_json;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_devices(
    args: DevicesArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        DevicesCommand::List => print_json(&ctx.client.devices().await?)?,
        DevicesCommand::Remove(args) => {
            ctx.client.remove_device(args.id).await?;
            println!("Removed device {}", args.id);
        }
    }
    Ok(())
}
