//! # Mailbox Runtime
//!
//! Reads one call request (JSON) from a file or stdin and prints the
//! decision as JSON on stdout. Logs go to stderr.
//!
//! ```text
//! mailbox-runtime --call share.json --state-file state.json
//! ```
//!
//! Exit code is 0 for both admitted and rejected calls; a rejection is a
//! decision, not a failure.

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use mailbox_runtime::{run_request, RuntimeConfig};
use mailbox_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::parse();
    let telemetry = init_telemetry(&TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let raw = if config.reads_stdin() {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read call request from stdin")?;
        buf
    } else {
        std::fs::read(&config.call)
            .with_context(|| format!("Failed to read call request {}", config.call.display()))?
    };

    let response = run_request(&config, &raw).await?;
    info!(
        admitted = response.admitted,
        committed = response.committed,
        "Call decided"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to encode response")?
    );

    if config.print_metrics {
        if let Some(text) = telemetry.render_metrics()? {
            eprintln!("{text}");
        }
    }
    Ok(())
}
