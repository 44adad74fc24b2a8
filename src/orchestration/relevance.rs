//! # Relevance Validation
//!
//! The idempotence guard that makes at-least-once delivery of DAG tasks safe:
//! before any mutating step, a processor confirms the loaded DAG is still
//! present and the action record itself is still pending. Redelivered or
//! duplicate actions become no-ops once the first successful processor has
//! cleaned up either one.

use tracing::{error, info};

use crate::error::Result;
use crate::models::{Dag, DagAction};
use crate::store::DagStateStore;

/// Result of the two-step "is this action still live" check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    /// Both checks passed; the kind-specific mutation may proceed
    Relevant,
    /// The DAG is gone: it completed or was cancelled out-of-band between
    /// enqueue and processing
    DagAbsent,
    /// The action record was already cleared by a concurrent processor or
    /// operator
    ActionCleaned,
}

impl Relevance {
    pub fn is_relevant(self) -> bool {
        matches!(self, Self::Relevant)
    }
}

/// Run the two relevance checks, in order, short-circuiting on the first
/// failure.
///
/// DAG presence is checked first: a store may legitimately hold stale action
/// bookkeeping for a DAG that is already gone, so the action-record check is
/// only meaningful for a live DAG. The action-record check hits the store
/// synchronously so it reflects concurrent cleanups, never a cached load.
pub async fn validate_action_relevance(
    store: &dyn DagStateStore,
    action: &DagAction,
    dag: Option<&Dag>,
) -> Result<Relevance> {
    if dag.is_none() {
        error!(
            flow_group = %action.flow_group(),
            flow_name = %action.flow_name(),
            flow_execution_id = action.flow_execution_id(),
            job_name = action.job_name(),
            action_type = %action.action_type(),
            dag_id = %action.dag_id(),
            "Dag not present when validating action; it may already have been cancelled or finished"
        );
        return Ok(Relevance::DagAbsent);
    }

    if !store.exists_dag_action(action).await? {
        info!(
            flow_group = %action.flow_group(),
            flow_name = %action.flow_name(),
            flow_execution_id = action.flow_execution_id(),
            job_name = action.job_name(),
            action_type = %action.action_type(),
            "Dag action already cleaned up from the state store; no further action required"
        );
        return Ok(Relevance::ActionCleaned);
    }

    Ok(Relevance::Relevant)
}
