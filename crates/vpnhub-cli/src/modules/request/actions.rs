use anyhow::Context;
use reqwest::Method;
use vpnhub_client::ApiRequest;

use crate::cli_args::*;
use crate::modules::system::output::print_json;
use crate::modules::system::CommandContext;

pub(crate) async fn handle_request(
    args: RequestArgs,
    ctx: &mut CommandContext<'_>,
) -> anyhow::Result<()> {
    let request = build_request(&args)?;
    let value = ctx.client.request(request).await?;
    if value.is_null() {
        println!("(empty response)");
        return Ok(());
    }
    print_json(&value)
}

/// Validates the raw arguments before anything is sent.
pub(crate) fn build_request(args: &RequestArgs) -> anyhow::Result<ApiRequest> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("invalid HTTP method: {}", args.method))?;
    let mut request = ApiRequest::new(method, args.endpoint.clone());

    if let Some(data) = args.data.as_deref() {
        let body: serde_json::Value =
            serde_json::from_str(data).context("invalid JSON body")?;
        request = request.with_body(body);
    }
    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("invalid header {header:?}; expected NAME:VALUE"))?;
        request = request.with_header(name.trim(), value.trim());
    }
    Ok(request)
}
