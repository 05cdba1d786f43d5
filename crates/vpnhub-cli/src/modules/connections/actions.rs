use crate::cli_args::*;
use crate::modules::system::output::print_json;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_connect(
    args: ConnectArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let connection = ctx
        .client
        .connect(args.server_id, args.protocol.as_deref())
        .await?;
    print_json(&connection)?;
    Ok(())
}

pub(crate) async fn handle_disconnect(
    args: DisconnectArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let id = match args.id {
        Some(id) => id,
        None => match ctx.client.current_connection().await? {
            Some(connection) => connection.id,
            None => {
                println!("Not connected");
                return Ok(());
            }
        },
    };
    ctx.client.disconnect(id).await?;
    println!("Disconnected ({id})");
    Ok(())
}

pub(crate) async fn handle_status(ctx: &mut CommandContext<'_>) -> anyhow::Result<()> {
    match ctx.client.current_connection().await? {
        Some(connection) => print_json(&connection)?,
        None => println!("Not connected"),
    }
    Ok(())
}
