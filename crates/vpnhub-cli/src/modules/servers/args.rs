use clap::{Args, Subcommand, ValueEnum};

#[derive(Args)]
pub struct ServersArgs {
    #[command(subcommand)]
    pub command: ServersCommand,
}

#[derive(Subcommand)]
pub enum ServersCommand {
    #[command(about = "List VPN servers")]
    List(ServersListArgs),
    #[command(about = "Show one VPN server")]
    Get(ServersGetArgs),
}

#[derive(Args)]
pub struct ServersListArgs {
    #[arg(long, help = "Only servers in this country (ISO code)")]
    pub country: Option<String>,
    #[arg(long, help = "Only servers offering this protocol")]
    pub protocol: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ServersGetArgs {
    pub id: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
