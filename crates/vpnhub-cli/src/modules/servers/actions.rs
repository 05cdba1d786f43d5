use vpnhub_client::ApiRequest;
use vpnhub_core::{endpoints, ServersResponse};

use super::format_table::render_servers_table;
use crate::cli_args::*;
use crate::modules::system::output::{append_params, build_params, opt_param, print_json};
use crate::modules::system::CommandContext;

pub(crate) async fn handle_servers(
    args: ServersArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        ServersCommand::List(args) => {
            let mut endpoint = endpoints::SERVERS.to_string();
            let params = build_params([
                opt_param("country", args.country.clone()),
                opt_param("protocol", args.protocol.clone()),
            ]);
            append_params(&mut endpoint, params);
            let response: ServersResponse =
                ctx.client.request_as(ApiRequest::get(endpoint)).await?;

            // Mock fixtures ignore the query, so filter here as well.
            let servers: Vec<_> = response
                .servers
                .into_iter()
                .filter(|server| {
                    args.country
                        .as_deref()
                        .is_none_or(|country| server.country.eq_ignore_ascii_case(country))
                })
                .filter(|server| {
                    args.protocol.as_deref().is_none_or(|protocol| {
                        server
                            .protocols
                            .iter()
                            .any(|offered| offered.eq_ignore_ascii_case(protocol))
                    })
                })
                .collect();
            match args.format {
                OutputFormat::Json => print_json(&servers)?,
                OutputFormat::Table => print!("{}", render_servers_table(&servers)),
            }
        }
        ServersCommand::Get(args) => {
            let server = ctx.client.server(args.id).await?;
            print_json(&server)?;
        }
    }
    Ok(())
}
