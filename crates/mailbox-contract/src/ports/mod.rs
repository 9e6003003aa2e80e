//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the mailbox authorization engine.
//! These are the interfaces between the domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `MailboxApi`
//! - **Driven Ports (Outbound)**: `GlobalStateStore`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
