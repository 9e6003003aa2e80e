//! # Driven Ports (SPI - Outbound)
//!
//! Persistence the engine depends on. The engine itself never writes: it
//! hands the store an admitted [`CallOutcome`] and the store applies it.

use crate::domain::entities::{CallOutcome, GlobalConfig, LocalShareRecord};
use crate::errors::StateError;
use async_trait::async_trait;

// =============================================================================
// GLOBAL STATE STORE
// =============================================================================

/// Application-level ledger state.
///
/// ## Implementation Notes
///
/// `commit` is all-or-nothing: either every write of the outcome lands or
/// none does. Implementations must refuse rejected outcomes.
#[async_trait]
pub trait GlobalStateStore: Send + Sync {
    /// Current config snapshot (`None` before creation or after deletion).
    async fn load_config(&self) -> Result<Option<GlobalConfig>, StateError>;

    /// Apply an admitted outcome. Returns the resulting snapshot.
    async fn commit(&self, outcome: &CallOutcome) -> Result<Option<GlobalConfig>, StateError>;

    /// Whether a recipient record has been written.
    ///
    /// Off-chain readers only; the engine never consults the registry.
    async fn has_local_record(&self, record: &LocalShareRecord) -> Result<bool, StateError>;

    /// Returns true once the instance exists.
    async fn is_created(&self) -> Result<bool, StateError> {
        Ok(self.load_config().await?.is_some())
    }
}
