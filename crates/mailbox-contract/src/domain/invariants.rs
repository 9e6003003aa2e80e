//! # Domain Invariants
//!
//! Properties every outcome must satisfy before it may be committed.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Rejected calls have no effect | `check_reject_is_inert_invariant()` |
//! | Only create/set_config write config | `check_config_writer_invariant()` |
//! | Creator never changes after create | `check_creator_immutable_invariant()` |
//! | Bulk log names the calling account | `check_bulk_log_invariant()` |
//! | Admitted bulk paid at least `fee * count` | `check_bulk_charge_invariant()` |

use crate::domain::entities::{Action, ApplicationCall, CallOutcome, GlobalConfig, OnCompletion};
use crate::domain::router::resolve_action;
use crate::domain::services::{btoi, bulk_charge, LogRecord};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// A rejected outcome carries no writes, no log and no local record.
#[must_use]
pub fn check_reject_is_inert_invariant(outcome: &CallOutcome) -> bool {
    outcome.admitted
        || (outcome.update.is_empty()
            && outcome.log.is_none()
            && outcome.local_record.is_none()
            && !outcome.delete_instance)
}

/// Config writes come only from creation or `set_config`.
#[must_use]
pub fn check_config_writer_invariant(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> bool {
    if outcome.update.is_empty() || snapshot.is_none() {
        return true;
    }
    matches!(resolve_action(call), Ok(Action::SetConfig))
}

/// After creation, no outcome writes the creator key.
#[must_use]
pub fn check_creator_immutable_invariant(
    snapshot: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> bool {
    snapshot.is_none() || outcome.update.creator.is_none()
}

/// An admitted bulk emits exactly the record its own arguments describe,
/// naming the calling account.
#[must_use]
pub fn check_bulk_log_invariant(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> bool {
    let Some(bulk) = admitted_bulk(call, snapshot, outcome) else {
        return true;
    };
    let expected = LogRecord::Bulk {
        version: bulk.config.version.clone(),
        merkle_root: call.arg(2).cloned().unwrap_or_default(),
        sender: call.sender,
        count: bulk.count,
    };
    outcome.log.as_ref() == Some(&expected.encode())
}

/// An admitted bulk is backed by a companion payment of at least
/// `fee * count` at the snapshot fee.
#[must_use]
pub fn check_bulk_charge_invariant(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> bool {
    let Some(bulk) = admitted_bulk(call, snapshot, outcome) else {
        return true;
    };
    let paid = call
        .group_index
        .checked_sub(1)
        .and_then(|i| call.group.get(i))
        .map_or(0, |payment| payment.amount);
    bulk_charge(bulk.config.fee, bulk.count).is_some_and(|required| paid >= required)
}

struct AdmittedBulk<'a> {
    config: &'a GlobalConfig,
    count: u64,
}

fn admitted_bulk<'a>(
    call: &ApplicationCall,
    snapshot: Option<&'a GlobalConfig>,
    outcome: &CallOutcome,
) -> Option<AdmittedBulk<'a>> {
    let config = snapshot?;
    if !outcome.admitted || call.on_completion != OnCompletion::NoOp {
        return None;
    }
    if resolve_action(call) != Ok(Action::Bulk) {
        return None;
    }
    // An undecodable count can only have been admitted by mistake; u64::MAX
    // makes both checks fail for it.
    let count = call
        .arg(3)
        .and_then(|raw| btoi(raw.as_slice()))
        .unwrap_or(u64::MAX);
    Some(AdmittedBulk { config, count })
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(
    call: &ApplicationCall,
    snapshot: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_reject_is_inert_invariant(outcome) {
        violations.push(InvariantViolation::RejectedWithEffects);
    }
    if !check_config_writer_invariant(call, snapshot, outcome) {
        violations.push(InvariantViolation::UnauthorizedConfigWriter);
    }
    if !check_creator_immutable_invariant(snapshot, outcome) {
        violations.push(InvariantViolation::CreatorRewritten);
    }
    if !check_bulk_log_invariant(call, snapshot, outcome) {
        violations.push(InvariantViolation::BulkLogMismatch);
    }
    if !check_bulk_charge_invariant(call, snapshot, outcome) {
        violations.push(InvariantViolation::BulkUnderpaid);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Rejected outcome carries writes or a log.
    RejectedWithEffects,
    /// Config written by something other than create/set_config.
    UnauthorizedConfigWriter,
    /// Creator key written after creation.
    CreatorRewritten,
    /// Bulk log disagrees with the call.
    BulkLogMismatch,
    /// Bulk admitted without covering `fee * count`.
    BulkUnderpaid,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RejectedWithEffects => write!(f, "rejected outcome carries effects"),
            Self::UnauthorizedConfigWriter => {
                write!(f, "config written outside create/set_config")
            }
            Self::CreatorRewritten => write!(f, "creator rewritten after creation"),
            Self::BulkLogMismatch => write!(f, "bulk log does not match the call"),
            Self::BulkUnderpaid => write!(f, "bulk admitted below fee * count"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
