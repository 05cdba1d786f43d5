use clap::Args;

#[derive(Args)]
pub struct RequestArgs {
    #[arg(help = "HTTP method (GET, POST, PUT, PATCH, DELETE)")]
    pub method: String,
    #[arg(help = "Endpoint relative to the API base, e.g. /servers")]
    pub endpoint: String,
    #[arg(long, short = 'd', help = "JSON request body")]
    pub data: Option<String>,
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,
}
