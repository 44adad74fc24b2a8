//! # Dag Processor Template
//!
//! The two-phase execution skeleton shared by every action kind: *initialize*
//! (load current state, read-only) then *act* (validate, then mutate, then
//! record the completion metric). Separating the phases keeps state loading
//! and state mutation individually auditable and testable.
//!
//! ## Lifecycle
//!
//! Per action instance: pending (enqueued) → validating (initialize plus
//! relevance checks) → either moot (terminal, no mutation) or enforcing (the
//! kind-specific hook runs) → done (metrics recorded). There is no internal
//! retry state; redelivery by the dispatcher re-enters at pending, and the
//! relevance check makes the re-entry a no-op once the first successful
//! processor cleaned up either the DAG or the action record.

use async_trait::async_trait;

use crate::error::Result;
use crate::metrics::DagProcEngineMetrics;
use crate::models::{DagAction, DagId};
use crate::store::DagStateStore;

/// Terminal outcome of one `act` invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActOutcome {
    /// The kind-specific mutation was attempted
    Enforced,
    /// Validation found the action no longer relevant; nothing was mutated
    Moot,
}

impl ActOutcome {
    pub fn is_enforced(self) -> bool {
        matches!(self, Self::Enforced)
    }
}

/// Two-phase execution contract for one DAG-action kind.
///
/// Implementations must not cache DAG existence across phases: `act` is
/// required to recheck relevance against the store synchronously, immediately
/// before mutating. I/O errors from either phase propagate to the dispatcher
/// unchanged; retry and backoff are entirely the dispatcher's responsibility
/// via redelivery.
#[async_trait]
pub trait DagProc: Send + Sync {
    /// State loaded by `initialize` and consumed by `act`
    type State: Send;

    /// The action this processor instance was built for
    fn dag_action(&self) -> &DagAction;

    /// Identity-derived id of the addressed DAG
    fn dag_id(&self) -> DagId {
        self.dag_action().dag_id()
    }

    /// Read-only phase: fetch whatever state the action needs. An absent DAG
    /// is an expected outcome and must be returned as empty state, not as an
    /// error.
    async fn initialize(&self, store: &dyn DagStateStore) -> Result<Self::State>;

    /// Validation-then-mutation phase. Must record exactly one completion
    /// metric for the action kind before returning `Ok`, tagged with whether
    /// real enforcement was attempted or the action short-circuited as moot.
    async fn act(
        &self,
        store: &dyn DagStateStore,
        state: Self::State,
        metrics: &DagProcEngineMetrics,
    ) -> Result<ActOutcome>;

    /// Template driver: run both phases to completion, recording the
    /// initialization metric tagged with the load's success.
    async fn process(
        &self,
        store: &dyn DagStateStore,
        metrics: &DagProcEngineMetrics,
    ) -> Result<ActOutcome> {
        let action_type = self.dag_action().action_type();
        let state = match self.initialize(store).await {
            Ok(state) => {
                metrics.mark_action_initialized(action_type, true);
                state
            }
            Err(err) => {
                metrics.mark_action_initialized(action_type, false);
                return Err(err);
            }
        };
        self.act(store, state, metrics).await
    }
}
