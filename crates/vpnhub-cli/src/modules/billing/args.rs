use clap::{Args, Subcommand};

#[derive(Args)]
pub struct BillingArgs {
    #[command(subcommand)]
    pub command: BillingCommand,
}

#[derive(Subcommand)]
pub enum BillingCommand {
    #[command(about = "List available plans")]
    Plans,
    #[command(about = "Show the current subscription")]
    Subscription,
    #[command(about = "Subscribe to a plan")]
    Subscribe(SubscribeArgs),
    #[command(about = "Cancel the current subscription")]
    Cancel,
    #[command(about = "List invoices")]
    Invoices,
}

#[derive(Args)]
pub struct SubscribeArgs {
    pub plan_id: String,
}
