//! # Dag State Store
//!
//! Contract with the persistence layer holding DAGs and pending action
//! records. The processing core treats the store as the sole synchronization
//! point between concurrently dispatched processors: every check-then-mutate
//! sequence relies on the store's own consistency guarantees, never on an
//! in-process lock held across a round-trip.

pub mod in_memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Dag, DagAction, DagActionType, DagId, JobState};

pub use in_memory::InMemoryDagStateStore;

/// Persistence contract consumed by DAG-action processors.
///
/// Implementations must provide read-after-write consistency for a single
/// action record, so `exists_job_dag_action` reflects cleanups performed by
/// concurrent processors. Timeouts on these calls are the implementation's
/// responsibility.
#[async_trait]
pub trait DagStateStore: Send + Sync {
    /// Fetch a DAG by id. An absent DAG is a normal outcome, not an error;
    /// it is authoritative for "already completed or removed".
    async fn get_dag(&self, dag_id: &DagId) -> Result<Option<Dag>>;

    /// Check whether a pending action record exists for the exact tuple.
    async fn exists_job_dag_action(
        &self,
        flow_group: &str,
        flow_name: &str,
        flow_execution_id: i64,
        job_name: Option<&str>,
        action_type: DagActionType,
    ) -> Result<bool>;

    /// Transition one job node's persisted state.
    async fn update_job_state(
        &self,
        dag_id: &DagId,
        job_name: &str,
        state: JobState,
    ) -> Result<()>;

    /// Remove a pending action record. Returns `false` when the record was
    /// already gone (a concurrent processor or operator cleaned it up).
    async fn delete_dag_action(&self, action: &DagAction) -> Result<bool>;

    /// Tuple-splitting convenience over [`Self::exists_job_dag_action`].
    async fn exists_dag_action(&self, action: &DagAction) -> Result<bool> {
        self.exists_job_dag_action(
            action.flow_group(),
            action.flow_name(),
            action.flow_execution_id(),
            action.job_name(),
            action.action_type(),
        )
        .await
    }
}
