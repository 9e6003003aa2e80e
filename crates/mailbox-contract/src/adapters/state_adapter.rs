//! # State Adapter
//!
//! In-memory global state store. Serves tests and the runtime binary, which
//! persists the [`StateSnapshot`] between invocations.

use crate::domain::entities::{CallOutcome, GlobalConfig, LocalShareRecord};
use crate::errors::StateError;
use crate::ports::outbound::GlobalStateStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serializable image of the application state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Global config (`None` before creation).
    pub config: Option<GlobalConfig>,
    /// Recipient registry.
    #[serde(default)]
    pub local_records: BTreeSet<LocalShareRecord>,
}

/// In-memory state store.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<StateSnapshot>,
}

impl InMemoryStateStore {
    /// Create an empty store (no instance yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding an existing instance.
    #[must_use]
    pub fn with_config(config: GlobalConfig) -> Self {
        Self::from_snapshot(StateSnapshot {
            config: Some(config),
            local_records: BTreeSet::new(),
        })
    }

    /// Restore a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: StateSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.read().clone()
    }

    /// Number of recipient records.
    #[must_use]
    pub fn local_record_count(&self) -> usize {
        self.state.read().local_records.len()
    }
}

/// Computes the snapshot that results from applying `outcome` to `current`.
///
/// Validates everything before anything is written, so a failed commit
/// leaves the store untouched.
fn next_config(
    current: Option<&GlobalConfig>,
    outcome: &CallOutcome,
) -> Result<Option<GlobalConfig>, StateError> {
    if !outcome.admitted {
        return Err(StateError::RejectedOutcome);
    }
    match current {
        None if outcome.update.is_empty() => Err(StateError::NotCreated),
        None => outcome
            .update
            .to_initial()
            .map(Some)
            .ok_or(StateError::IncompleteInitialConfig),
        Some(_) if outcome.update.creator.is_some() => Err(StateError::AlreadyCreated),
        Some(_) if outcome.delete_instance => Ok(None),
        Some(config) => Ok(Some(outcome.update.apply_to(config))),
    }
}

#[async_trait]
impl GlobalStateStore for InMemoryStateStore {
    async fn load_config(&self) -> Result<Option<GlobalConfig>, StateError> {
        Ok(self.state.read().config.clone())
    }

    async fn commit(&self, outcome: &CallOutcome) -> Result<Option<GlobalConfig>, StateError> {
        let mut state = self.state.write();
        let next = next_config(state.config.as_ref(), outcome)?;

        match (&next, &outcome.local_record) {
            (None, _) => state.local_records.clear(),
            (Some(_), Some(record)) => {
                // At most once: a repeated share leaves the set unchanged.
                state.local_records.insert(record.clone());
            }
            (Some(_), None) => {}
        }
        state.config.clone_from(&next);
        Ok(next)
    }

    async fn has_local_record(&self, record: &LocalShareRecord) -> Result<bool, StateError> {
        Ok(self.state.read().local_records.contains(record))
    }
}

// =============================================================================
// TESTS
// =============================================================================
