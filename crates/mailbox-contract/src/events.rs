//! # Event Schema
//!
//! Request/response payloads for driving the engine over a message channel
//! (or from a file, as the runtime binary does).
//!
//! - **Correlation IDs:** every response echoes the request's `correlation_id`
//! - **Rejections are responses:** a rejected call yields `admitted: false`,
//!   never an error

use crate::domain::entities::{ApplicationCall, CallOutcome, LocalShareRecord, StateChange};
use crate::domain::value_objects::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// INBOUND EVENTS
// =============================================================================

/// Request to decide on an application call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallRequestPayload {
    /// Request identifier; generated when absent.
    #[serde(default = "Uuid::new_v4")]
    pub correlation_id: Uuid,
    /// The call and its group.
    pub call: ApplicationCall,
    /// Evaluate only; never commit.
    #[serde(default)]
    pub dry_run: bool,
}

impl CallRequestPayload {
    /// Request that commits when admitted.
    #[must_use]
    pub fn submit(call: ApplicationCall) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            call,
            dry_run: false,
        }
    }

    /// Request that only evaluates.
    #[must_use]
    pub fn dry_run(call: ApplicationCall) -> Self {
        Self {
            dry_run: true,
            ..Self::submit(call)
        }
    }
}

// =============================================================================
// OUTBOUND EVENTS
// =============================================================================

/// Decision on an application call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResponsePayload {
    /// Echo of the request's correlation ID.
    pub correlation_id: Uuid,
    /// Whether the call is admitted.
    pub admitted: bool,
    /// Whether the effects were committed.
    pub committed: bool,
    /// Global key writes, in key order.
    pub state_changes: Vec<StateChange>,
    /// Emitted log record.
    pub log: Option<Bytes>,
    /// Recipient registry entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_record: Option<LocalShareRecord>,
    /// The instance was deleted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
    /// Stable label of the rejection reason.
    pub rejection_label: Option<String>,
    /// Human-readable rejection reason.
    pub rejection_reason: Option<String>,
}

impl CallResponsePayload {
    /// Builds a response from an outcome.
    #[must_use]
    pub fn from_outcome(correlation_id: Uuid, outcome: &CallOutcome, committed: bool) -> Self {
        Self {
            correlation_id,
            admitted: outcome.admitted,
            committed,
            state_changes: outcome.state_changes(),
            log: outcome.log.clone(),
            local_record: outcome.local_record.clone(),
            deleted: committed && outcome.delete_instance,
            rejection_label: outcome.rejection.as_ref().map(|r| r.label().to_string()),
            rejection_reason: outcome.rejection.as_ref().map(ToString::to_string),
        }
    }
}

// =============================================================================
// TOPICS
// =============================================================================

/// Channel names for the mailbox application.
pub mod topics {
    /// Topic for incoming call requests.
    pub const CALL_REQUEST: &str = "mailbox.call.request";

    /// Topic for call decisions.
    pub const CALL_RESPONSE: &str = "mailbox.call.response";

    /// Topic on which admitted share/bulk log records are published.
    pub const SHARE_LOG: &str = "mailbox.log";
}

// =============================================================================
// TESTS
// =============================================================================
