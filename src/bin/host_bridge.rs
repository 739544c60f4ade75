//! Headless host binary for stdin/stdout JSON tool calls.
//!
//! Reads requests as newline-delimited JSON from stdin, runs the named
//! search tool, and writes one response line per request to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use fanout::bridge::run_stdio_bridge;
use fanout::{HostConfig, build_tools};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("fanout=info,fanout_search=info")
            }),
        )
        .init();

    tracing::info!("fanout-host starting");

    let config = HostConfig::load().map_err(|e| {
        tracing::error!(error = %e, "failed to load configuration");
        anyhow::anyhow!("fanout-host config: {e}")
    })?;
    let tools = build_tools(&config).map_err(|e| anyhow::anyhow!("fanout-host setup: {e}"))?;

    run_stdio_bridge(&tools).await.map_err(|e| {
        tracing::error!(error = %e, "fanout-host exited with error");
        anyhow::anyhow!("fanout-host failed: {e}")
    })?;

    tracing::info!("fanout-host shut down cleanly");
    Ok(())
}
