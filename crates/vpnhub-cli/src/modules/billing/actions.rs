use crate::cli_args::*;
use crate::modules::system::output::print_json;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_billing(
    args: BillingArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    match args.command {
        BillingCommand::Plans => print_json(&ctx.client.plans().await?)?,
        BillingCommand::Subscription => match ctx.client.subscription().await? {
            Some(subscription) => print_json(&subscription)?,
            None => println!("No active subscription"),
        },
        BillingCommand::Subscribe(args) => {
            match ctx.client.subscribe(&args.plan_id).await? {
                Some(subscription) => print_json(&subscription)?,
                None => println!("Subscribed to {}", args.plan_id),
            }
        }
        BillingCommand::Cancel => match ctx.client.cancel_subscription().await? {
            Some(subscription) => print_json(&subscription)?,
            None => println!("Subscription cancelled"),
        },
        BillingCommand::Invoices => print_json(&ctx.client.invoices().await?)?,
    }
    Ok(())
}
