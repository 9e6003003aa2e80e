//! # Mailbox Contract - Authorization Engine
//!
//! Decides, for every call made to the mailbox application, whether the call
//! is admitted and what it writes. Users pay a per-share fee (or `fee * count`
//! for a bulk batch) through a payment placed immediately before the call in
//! the same atomic group; admitted shares emit a log record that off-chain
//! indexers consume.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Rejected calls have no effect | `domain/invariants.rs` - `check_reject_is_inert_invariant()` |
//! | Only create/set_config write config | `domain/invariants.rs` - `check_config_writer_invariant()` |
//! | Creator never changes | `domain/invariants.rs` - `check_creator_immutable_invariant()` |
//! | Bulk paid at least `fee * count` | `domain/invariants.rs` - `check_bulk_charge_invariant()` |
//!
//! ## Operations
//!
//! | Call | Who | Gate |
//! |------|-----|------|
//! | create | anyone (first call) | no rekey |
//! | `share` | anyone | version, payment of `fee` |
//! | `bulk` | anyone | version, payment of `fee * count` |
//! | `set_config` | creator | none beyond caller |
//! | update / delete | creator | no rekey |
//! | close-out | anyone | no rekey |
//! | opt-in | nobody | always rejected |
//!
//! ## Usage Example
//!
//! ```ignore
//! use mailbox_contract::prelude::*;
//!
//! let service = create_test_service();
//! let outcome = service.submit(&ApplicationCall::no_op(creator, vec![])).await?;
//! assert!(outcome.admitted);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Action, ApplicationCall, CallOutcome, ConfigUpdate, Effects, EngineConfig, GlobalConfig,
        GlobalKey, GroupTransaction, LocalShareRecord, OnCompletion, StateChange, StateValue,
        TxType,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Bytes};

    // Domain services
    pub use crate::domain::router::{evaluate, operation_name};
    pub use crate::domain::services::{btoi, bulk_charge, itob, LogRecord};

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::MailboxApi;
    pub use crate::ports::outbound::GlobalStateStore;

    // Events
    pub use crate::events::{topics, CallRequestPayload, CallResponsePayload};

    // Errors
    pub use crate::errors::{AuthorizationError, EventError, PaymentError, StateError};

    // Adapters
    pub use crate::adapters::{InMemoryStateStore, MailboxEventHandler, StateSnapshot};

    // Service
    pub use crate::service::{create_test_service, MailboxService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name used in logs and metrics.
pub const APP_NAME: &str = "mailbox";

// =============================================================================
// TESTS
// =============================================================================
