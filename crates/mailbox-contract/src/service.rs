//! # Mailbox Service
//!
//! Wires the pure engine to a [`GlobalStateStore`].
//!
//! - `evaluate` is a dry run against the current snapshot
//! - `submit` evaluates and commits under one lock, so calls are applied
//!   in a single linear order and no evaluation sees a half-applied update
//! - Every decision is logged; rejections are counted by reason

use crate::adapters::InMemoryStateStore;
use crate::domain::entities::{ApplicationCall, CallOutcome, EngineConfig, GlobalConfig};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::router::{evaluate, operation_name};
use crate::errors::StateError;
use crate::ports::inbound::MailboxApi;
use crate::ports::outbound::GlobalStateStore;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Mailbox service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Engine tunables.
    pub engine: EngineConfig,
    /// Check domain invariants on every outcome before committing.
    pub check_invariants: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            check_invariants: true,
        }
    }
}

/// Statistics for the mailbox service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Calls evaluated (dry runs and submissions).
    pub evaluations: u64,
    /// Admitted calls.
    pub admitted: u64,
    /// Rejected calls.
    pub rejected: u64,
    /// Rejections keyed by reason label.
    pub rejections_by_reason: BTreeMap<&'static str, u64>,
    /// Outcomes written to the store.
    pub commits: u64,
}

/// The main mailbox service.
pub struct MailboxService<S: GlobalStateStore> {
    /// Service configuration.
    config: ServiceConfig,
    /// State store adapter.
    store: Arc<S>,
    /// Serializes evaluate-and-commit.
    submit_lock: Mutex<()>,
    /// Service statistics.
    stats: RwLock<ServiceStats>,
}

impl<S: GlobalStateStore> MailboxService<S> {
    /// Create a new mailbox service.
    pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
        Self {
            config,
            store,
            submit_lock: Mutex::new(()),
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// The underlying state store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Decides on a call against `snapshot` and records the decision.
    async fn decide(
        &self,
        call: &ApplicationCall,
        snapshot: Option<&GlobalConfig>,
    ) -> Result<CallOutcome, StateError> {
        let operation = operation_name(call, snapshot);
        let outcome = evaluate(call, snapshot, &self.config.engine);

        if self.config.check_invariants {
            if let InvariantCheckResult::Invalid(violations) =
                check_all_invariants(call, snapshot, &outcome)
            {
                let detail = violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                error!(operation, %detail, "Outcome failed invariant checks");
                return Err(StateError::InvariantViolated(detail));
            }
        }

        self.record(operation, &outcome).await;
        Ok(outcome)
    }

    async fn record(&self, operation: &'static str, outcome: &CallOutcome) {
        let mut stats = self.stats.write().await;
        stats.evaluations += 1;

        match &outcome.rejection {
            None => {
                stats.admitted += 1;
                debug!(operation, log = outcome.log.is_some(), "Call admitted");
                #[cfg(feature = "metrics")]
                mailbox_telemetry::metrics::record_admitted(operation);
            }
            Some(reason) => {
                stats.rejected += 1;
                *stats.rejections_by_reason.entry(reason.label()).or_default() += 1;
                info!(operation, reason = reason.label(), detail = %reason, "Call rejected");
                #[cfg(feature = "metrics")]
                mailbox_telemetry::metrics::record_rejected(operation, reason.label());
            }
        }
    }
}

#[async_trait]
impl<S: GlobalStateStore> MailboxApi for MailboxService<S> {
    #[instrument(skip(self, call), fields(sender = %call.sender, phase = %call.on_completion))]
    async fn evaluate(&self, call: &ApplicationCall) -> Result<CallOutcome, StateError> {
        let snapshot = self.store.load_config().await?;
        self.decide(call, snapshot.as_ref()).await
    }

    #[instrument(skip(self, call), fields(sender = %call.sender, phase = %call.on_completion))]
    async fn submit(&self, call: &ApplicationCall) -> Result<CallOutcome, StateError> {
        let _guard = self.submit_lock.lock().await;

        let snapshot = self.store.load_config().await?;
        let outcome = self.decide(call, snapshot.as_ref()).await?;
        if !outcome.admitted {
            return Ok(outcome);
        }

        match self.store.commit(&outcome).await {
            Ok(next) => {
                self.stats.write().await.commits += 1;
                if next.is_none() && snapshot.is_some() {
                    warn!("Application instance deleted");
                }
                Ok(outcome)
            }
            Err(e) => {
                error!(error = %e, "Commit failed");
                Err(e)
            }
        }
    }
}

/// Service over a fresh in-memory store with default configuration.
#[must_use]
pub fn create_test_service() -> MailboxService<InMemoryStateStore> {
    MailboxService::new(Arc::new(InMemoryStateStore::new()), ServiceConfig::default())
}

// =============================================================================
// TESTS
// =============================================================================
