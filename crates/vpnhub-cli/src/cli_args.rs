use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::auth::args::*;
pub use crate::modules::billing::args::*;
pub use crate::modules::connections::args::*;
pub use crate::modules::devices::args::*;
pub use crate::modules::request::args::*;
pub use crate::modules::servers::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "vpnhub")]
#[command(about = "VPNHub CLI")]
pub struct Cli {
    #[arg(long, env = "VPNHUB_ADDR", help = "API base URL (e.g. https://vpnhub.example/api)")]
    pub addr: Option<String>,
    #[arg(long, env = "VPNHUB_TOKEN", help = "Use this access token instead of stored credentials")]
    pub token: Option<String>,
    #[arg(long)]
    pub context: Option<String>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[arg(long, help = "Serve every call from built-in demo data")]
    pub mock: bool,
    #[arg(long, default_value_t = 30, help = "Request timeout in seconds")]
    pub timeout: u64,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Config(ConfigArgs),
    Login(LoginArgs),
    Register(RegisterArgs),
    Logout,
    #[command(about = "Show the logged-in user's profile")]
    Whoami,
    Servers(ServersArgs),
    #[command(about = "Start a VPN session on a server")]
    Connect(ConnectArgs),
    #[command(about = "End the current (or given) VPN session")]
    Disconnect(DisconnectArgs),
    #[command(about = "Show the current VPN session")]
    Status,
    Billing(BillingArgs),
    Devices(DevicesArgs),
    #[command(about = "Send a raw API request and print the JSON response")]
    Request(RequestArgs),
}
