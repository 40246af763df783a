use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use shadow_call::core::config;
use shadow_call::{ApiClient, OutputMode, output, parse_request};

/// Call a Shadowserver API method with a signed JSON request
#[derive(Parser)]
#[command(name = "shadow-call", version)]
struct Cli {
    /// API method, appended to the configured base URI (e.g. test/ping)
    method: String,

    /// Request body, a JSON object (e.g. '{}')
    request: String,

    /// Output format; prints the body as text when omitted
    #[arg(value_enum)]
    mode: Option<OutputMode>,

    /// Credentials file (default: ~/.shadowserver.api)
    #[arg(long, env = "SHADOWSERVER_API_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the response only
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let request = parse_request(&cli.request).context("JSON Exception")?;

    let credentials = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load_credentials(),
    }
    .context("Exception")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let client = ApiClient::new(credentials).context("API Exception")?;
    let body = rt
        .block_on(client.invoke(&cli.method, &serde_json::Value::Object(request)))
        .context("API Exception")?;

    tracing::info!("{} returned {} bytes", cli.method, body.len());

    let mode = cli.mode.unwrap_or_default();
    output::write_to(mode, &body, &mut std::io::stdout().lock()).context("failed to write response")?;
    Ok(())
}
