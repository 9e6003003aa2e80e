//! # Domain Layer (Inner Hexagon)
//!
//! Pure authorization logic for the mailbox application.
//! NO I/O, NO async, NO external dependencies.
//!
//! - Every evaluation is a function of the call, its group and the config
//!   snapshot; nothing else is read.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod entities;
pub mod handlers;
pub mod invariants;
pub mod payment;
pub mod router;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use payment::validate_group_payment;
pub use router::{evaluate, operation_name, resolve_action, route};
pub use services::*;
pub use value_objects::*;
