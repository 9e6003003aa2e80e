//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the engine to storage and to message channels.
//!
//! - Adapters implement domain ports
//! - The domain never depends on anything in here

pub mod event_handler;
pub mod state_adapter;

pub use event_handler::*;
pub use state_adapter::*;
