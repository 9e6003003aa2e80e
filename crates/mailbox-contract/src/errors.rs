//! # Error Types
//!
//! All error types for call authorization and state access.

use crate::domain::value_objects::{Address, Bytes};
use thiserror::Error;

// =============================================================================
// AUTHORIZATION ERRORS
// =============================================================================

/// Reasons a call is rejected.
///
/// Every variant is terminal for the call: no writes, no log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// Wrong argument count or shape.
    #[error("malformed call: {0}")]
    MalformedCall(String),

    /// Presented version tag differs from the stored one.
    #[error("version mismatch: expected {expected:?}, got {presented:?}")]
    VersionMismatch { expected: Bytes, presented: Bytes },

    /// Non-creator invoked a creator-only operation.
    #[error("unauthorized caller: {caller} is not the creator")]
    UnauthorizedCaller { caller: Address },

    /// Rekey target is not the zero address.
    #[error("rekey attempt to {target}")]
    RekeyAttempt { target: Address },

    /// Companion payment check failed.
    #[error("payment check failed: {0}")]
    Payment(#[from] PaymentError),

    /// `fee * count` does not fit in 64 bits.
    #[error("arithmetic overflow: fee {fee} * count {count}")]
    ArithmeticOverflow { fee: u64, count: u64 },

    /// Argument 1 names no known action.
    #[error("unknown action: {0:?}")]
    UnknownAction(Bytes),

    /// Opting in is never allowed.
    #[error("opt-in is not supported")]
    OptInRejected,
}

impl AuthorizationError {
    /// Short, stable label for stats and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MalformedCall(_) => "malformed_call",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::UnauthorizedCaller { .. } => "unauthorized_caller",
            Self::RekeyAttempt { .. } => "rekey_attempt",
            Self::Payment(PaymentError::Missing(_)) => "payment_missing",
            Self::Payment(PaymentError::Misdirected { .. }) => "payment_misdirected",
            Self::Payment(PaymentError::Insufficient { .. }) => "payment_insufficient",
            Self::ArithmeticOverflow { .. } => "arithmetic_overflow",
            Self::UnknownAction(_) => "unknown_action",
            Self::OptInRejected => "opt_in_rejected",
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCall(reason.into())
    }
}

// =============================================================================
// PAYMENT ERRORS
// =============================================================================

/// Sub-failures of the group payment validator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// No usable payment precedes the call.
    #[error("missing: {0}")]
    Missing(String),

    /// A payment precedes the call but between the wrong parties.
    #[error("misdirected: {field} is {actual}, expected {expected}")]
    Misdirected {
        field: &'static str,
        expected: Address,
        actual: Address,
    },

    /// The payment is below the required amount.
    #[error("insufficient: paid {paid}, required {required}")]
    Insufficient { required: u64, paid: u64 },
}

// =============================================================================
// STATE ERRORS
// =============================================================================

/// Errors from the global state store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// Commit of a creation outcome against an existing instance.
    #[error("application already created")]
    AlreadyCreated,

    /// Non-creation outcome against an instance that does not exist.
    #[error("application not created")]
    NotCreated,

    /// Creation outcome that does not initialize every key.
    #[error("incomplete initial config")]
    IncompleteInitialConfig,

    /// Attempt to commit a rejected outcome.
    #[error("refusing to commit a rejected outcome")]
    RejectedOutcome,

    /// Outcome failed an invariant check and was not committed.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    /// Other state error.
    #[error("state error: {0}")]
    Other(String),
}

// =============================================================================
// EVENT ERRORS
// =============================================================================

/// Errors while handling a serialized request.
#[derive(Debug, Error)]
pub enum EventError {
    /// Payload is not a valid request.
    #[error("failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// State store failed while serving the request.
    #[error(transparent)]
    State(#[from] StateError),
}

// =============================================================================
// TESTS
// =============================================================================
