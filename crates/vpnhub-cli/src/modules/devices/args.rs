use clap::{Args, Subcommand};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Subcommand)]
pub enum DevicesCommand {
    #[command(about = "List registered devices")]
    List,
    #[command(about = "Remove a registered device")]
    Remove(RemoveDeviceArgs),
}

#[derive(Args)]
pub struct RemoveDeviceArgs {
    pub id: i64,
}
