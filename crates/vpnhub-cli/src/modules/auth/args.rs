use clap::Args;

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, env = "VPNHUB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "VPNHUB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
}
