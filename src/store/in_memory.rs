//! In-memory [`DagStateStore`] used by tests and embedders that do not need a
//! durable backend. A contract witness, not a storage engine: each dashmap
//! entry gives the read-after-write consistency per record the trait demands.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::{DagFlowError, Result};
use crate::models::{Dag, DagAction, DagActionType, DagId, JobState};
use crate::store::DagStateStore;

/// Dashmap-backed store holding DAGs by id and pending action records by
/// their full tuple.
#[derive(Debug, Default)]
pub struct InMemoryDagStateStore {
    dags: DashMap<DagId, Dag>,
    actions: DashMap<DagAction, DateTime<Utc>>,
}

impl InMemoryDagStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a DAG (flow compilation / archival are out of scope,
    /// so seeding is an inherent method rather than part of the contract)
    pub fn put_dag(&self, dag: Dag) {
        self.dags.insert(dag.id().clone(), dag);
    }

    /// Record a pending action
    pub fn put_dag_action(&self, action: DagAction) {
        self.actions.insert(action, Utc::now());
    }

    pub fn remove_dag(&self, dag_id: &DagId) -> bool {
        self.dags.remove(dag_id).is_some()
    }

    pub fn contains_action(&self, action: &DagAction) -> bool {
        self.actions.contains_key(action)
    }

    /// Clone the current state of a DAG for assertions
    pub fn dag_snapshot(&self, dag_id: &DagId) -> Option<Dag> {
        self.dags.get(dag_id).map(|entry| entry.clone())
    }
}

#[async_trait]
impl DagStateStore for InMemoryDagStateStore {
    async fn get_dag(&self, dag_id: &DagId) -> Result<Option<Dag>> {
        Ok(self.dags.get(dag_id).map(|entry| entry.clone()))
    }

    async fn exists_job_dag_action(
        &self,
        flow_group: &str,
        flow_name: &str,
        flow_execution_id: i64,
        job_name: Option<&str>,
        action_type: DagActionType,
    ) -> Result<bool> {
        let probe = DagAction::new(
            flow_group,
            flow_name,
            flow_execution_id,
            job_name.map(str::to_string),
            action_type,
        );
        Ok(self.actions.contains_key(&probe))
    }

    async fn update_job_state(
        &self,
        dag_id: &DagId,
        job_name: &str,
        state: JobState,
    ) -> Result<()> {
        let mut dag = self.dags.get_mut(dag_id).ok_or_else(|| {
            DagFlowError::Store(format!("dag {dag_id} not found for job state update"))
        })?;
        let plan = dag.node_mut(job_name).ok_or_else(|| {
            DagFlowError::Store(format!("job {job_name} not found in dag {dag_id}"))
        })?;
        plan.transition_to(state);
        Ok(())
    }

    async fn delete_dag_action(&self, action: &DagAction) -> Result<bool> {
        Ok(self.actions.remove(action).is_some())
    }
}
