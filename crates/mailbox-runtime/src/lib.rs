//! # Mailbox Runtime
//!
//! Drives the authorization engine from the command line:
//!
//! 1. Load the state snapshot (empty if the file does not exist)
//! 2. Decode the call request
//! 3. Evaluate it, and commit if admitted and not a dry run
//! 4. Persist the new snapshot and return the decision

pub mod config;
pub mod state_file;

pub use config::RuntimeConfig;

use anyhow::{Context, Result};
use mailbox_contract::prelude::*;
use std::sync::Arc;
use tracing::info;

/// Decides one call request against the state file named in `config`.
///
/// # Errors
///
/// Unreadable state, undecodable requests and state store failures.
pub async fn run_request(config: &RuntimeConfig, raw_request: &[u8]) -> Result<CallResponsePayload> {
    let mut request: CallRequestPayload =
        serde_json::from_slice(raw_request).context("Failed to decode call request")?;
    request.dry_run |= config.dry_run;

    let snapshot = state_file::load_snapshot(&config.state_file)?;
    let store = Arc::new(InMemoryStateStore::from_snapshot(snapshot));
    let service = Arc::new(MailboxService::new(
        Arc::clone(&store),
        config.service_config(),
    ));
    let handler = MailboxEventHandler::new(service);

    let response = handler
        .handle_call(request)
        .await
        .context("State store rejected the outcome")?;

    if response.committed {
        state_file::save_snapshot(&config.state_file, &store.snapshot())?;
        info!(
            correlation_id = %response.correlation_id,
            state_file = %config.state_file.display(),
            "State committed"
        );
    }
    Ok(response)
}
