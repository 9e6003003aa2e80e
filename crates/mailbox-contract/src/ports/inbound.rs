//! # Driving Ports (API - Inbound)
//!
//! The interface the ledger (or a tool standing in for it) uses to ask the
//! engine for a decision on an application call.

use crate::domain::entities::{ApplicationCall, CallOutcome};
use crate::errors::StateError;
use async_trait::async_trait;

// =============================================================================
// MAILBOX API (Primary Driving Port)
// =============================================================================

/// Primary API of the mailbox application.
///
/// Both operations return `Ok` for rejected calls: a rejection is a decision,
/// not a failure. `Err` is reserved for the state store.
///
/// ## Usage
///
/// ```ignore
/// let outcome = api.submit(&call).await?;
/// if outcome.admitted {
///     println!("log: {:?}", outcome.log);
/// }
/// ```
#[async_trait]
pub trait MailboxApi: Send + Sync {
    /// Evaluate a call against the current snapshot without committing.
    async fn evaluate(&self, call: &ApplicationCall) -> Result<CallOutcome, StateError>;

    /// Evaluate a call and, if admitted, commit its effects atomically.
    ///
    /// Submissions are applied one at a time, in arrival order.
    async fn submit(&self, call: &ApplicationCall) -> Result<CallOutcome, StateError>;
}
