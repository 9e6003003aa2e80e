//! # Event Handler Adapter
//!
//! Translates [`CallRequestPayload`]s into [`MailboxApi`] calls and the
//! resulting outcomes into [`CallResponsePayload`]s.

use crate::errors::{EventError, StateError};
use crate::events::{CallRequestPayload, CallResponsePayload};
use crate::ports::inbound::MailboxApi;
use std::sync::Arc;
use tracing::debug;

/// Event handler for mailbox call requests.
pub struct MailboxEventHandler<T: MailboxApi> {
    /// The mailbox API implementation.
    api: Arc<T>,
}

impl<T: MailboxApi> MailboxEventHandler<T> {
    /// Create a new event handler.
    pub fn new(api: Arc<T>) -> Self {
        Self { api }
    }

    /// Handle a decoded call request.
    ///
    /// # Errors
    ///
    /// Only state store failures; rejected calls are ordinary responses.
    pub async fn handle_call(
        &self,
        payload: CallRequestPayload,
    ) -> Result<CallResponsePayload, StateError> {
        let CallRequestPayload {
            correlation_id,
            call,
            dry_run,
        } = payload;

        let outcome = if dry_run {
            self.api.evaluate(&call).await?
        } else {
            self.api.submit(&call).await?
        };
        let committed = outcome.admitted && !dry_run;

        debug!(%correlation_id, admitted = outcome.admitted, committed, "Call request handled");
        Ok(CallResponsePayload::from_outcome(
            correlation_id,
            &outcome,
            committed,
        ))
    }

    /// Handle a JSON-encoded call request.
    ///
    /// # Errors
    ///
    /// Undecodable payloads and state store failures.
    pub async fn handle_json(&self, raw: &[u8]) -> Result<CallResponsePayload, EventError> {
        let payload: CallRequestPayload = serde_json::from_slice(raw)?;
        Ok(self.handle_call(payload).await?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
