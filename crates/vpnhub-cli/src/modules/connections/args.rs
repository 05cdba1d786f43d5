use clap::Args;

#[derive(Args)]
pub struct ConnectArgs {
    pub server_id: i64,
    #[arg(long, help = "Tunnel protocol (e.g. wireguard, openvpn)")]
    pub protocol: Option<String>,
}

#[derive(Args)]
pub struct DisconnectArgs {
    #[arg(help = "Connection id; defaults to the current connection")]
    pub id: Option<i64>,
}
