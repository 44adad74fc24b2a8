//! Shared test doubles and builders for the deadline-enforcement suites.
#![allow(dead_code)] // each test binary uses a different subset

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use dagflow_core::{
    Dag, DagAction, DagActionType, DagFlowError, DagId, DagProcEngineMetrics, DagStateStore,
    DeadlineEnforcer, InMemoryDagStateStore, JobExecutionPlan, JobState, Result,
};

/// One observed store round-trip
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    GetDag(DagId),
    ExistsDagAction(DagAction),
    UpdateJobState {
        dag_id: DagId,
        job_name: String,
        state: JobState,
    },
    DeleteDagAction(DagAction),
}

/// Store double delegating to the in-memory store while recording every call
/// and optionally injecting transient failures.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: InMemoryDagStateStore,
    calls: Mutex<Vec<StoreCall>>,
    fail_get_dag: AtomicBool,
    fail_exists_check: AtomicBool,
    fail_job_updates: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_get_dag(&self) {
        self.fail_get_dag.store(true, Ordering::SeqCst);
    }

    pub fn fail_exists_check(&self) {
        self.fail_exists_check.store(true, Ordering::SeqCst);
    }

    pub fn fail_job_updates(&self) {
        self.fail_job_updates.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn job_update_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, StoreCall::UpdateJobState { .. }))
            .count()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl DagStateStore for RecordingStore {
    async fn get_dag(&self, dag_id: &DagId) -> Result<Option<Dag>> {
        self.record(StoreCall::GetDag(dag_id.clone()));
        if self.fail_get_dag.load(Ordering::SeqCst) {
            return Err(DagFlowError::Store("injected get_dag failure".to_string()));
        }
        self.inner.get_dag(dag_id).await
    }

    async fn exists_job_dag_action(
        &self,
        flow_group: &str,
        flow_name: &str,
        flow_execution_id: i64,
        job_name: Option<&str>,
        action_type: DagActionType,
    ) -> Result<bool> {
        self.record(StoreCall::ExistsDagAction(DagAction::new(
            flow_group,
            flow_name,
            flow_execution_id,
            job_name.map(str::to_string),
            action_type,
        )));
        if self.fail_exists_check.load(Ordering::SeqCst) {
            return Err(DagFlowError::Store(
                "injected exists_job_dag_action failure".to_string(),
            ));
        }
        self.inner
            .exists_job_dag_action(flow_group, flow_name, flow_execution_id, job_name, action_type)
            .await
    }

    async fn update_job_state(
        &self,
        dag_id: &DagId,
        job_name: &str,
        state: JobState,
    ) -> Result<()> {
        self.record(StoreCall::UpdateJobState {
            dag_id: dag_id.clone(),
            job_name: job_name.to_string(),
            state,
        });
        if self.fail_job_updates.load(Ordering::SeqCst) {
            return Err(DagFlowError::Store(
                "injected update_job_state failure".to_string(),
            ));
        }
        self.inner.update_job_state(dag_id, job_name, state).await
    }

    async fn delete_dag_action(&self, action: &DagAction) -> Result<bool> {
        self.record(StoreCall::DeleteDagAction(action.clone()));
        self.inner.delete_dag_action(action).await
    }
}

/// Enforcement-hook double counting invocations. Mirrors the shipped hooks'
/// contract by removing the action record as its final step, unless built
/// with [`CountingEnforcer::failing`], in which case it errors first.
pub struct CountingEnforcer {
    invocations: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingEnforcer {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (
            Self {
                invocations: invocations.clone(),
                fail: false,
            },
            invocations,
        )
    }

    pub fn failing() -> (Self, Arc<AtomicUsize>) {
        let invocations = Arc::new(AtomicUsize::new(0));
        (
            Self {
                invocations: invocations.clone(),
                fail: true,
            },
            invocations,
        )
    }
}

#[async_trait]
impl DeadlineEnforcer for CountingEnforcer {
    async fn enforce_deadline(
        &self,
        store: &dyn DagStateStore,
        action: &DagAction,
        _dag: &Dag,
        _metrics: &DagProcEngineMetrics,
    ) -> Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DagFlowError::Enforcement(
                "injected enforcement failure".to_string(),
            ));
        }
        store.delete_dag_action(action).await?;
        Ok(())
    }
}

/// Canonical action used across the suites: (g1, f1, 100, job1, enforce_completion_deadline)
pub fn completion_action() -> DagAction {
    DagAction::for_job(
        "g1",
        "f1",
        100,
        "job1",
        DagActionType::EnforceCompletionDeadline,
    )
}

pub fn start_action() -> DagAction {
    DagAction::for_job("g1", "f1", 100, "job1", DagActionType::EnforceStartDeadline)
}

pub fn dag_id() -> DagId {
    DagId::from_parts("g1", "f1", 100)
}

/// Single-job DAG whose job has been running since `started_ago`, with the
/// given completion budget
pub fn dag_with_running_job(budget: Option<Duration>, started_ago: Duration) -> Dag {
    let started_at = Utc::now() - chrono::Duration::from_std(started_ago).unwrap();
    let mut plan = JobExecutionPlan::new("g1", "f1", 100, "job1")
        .with_state(JobState::Running)
        .with_started_at(started_at);
    if let Some(budget) = budget {
        plan = plan.with_completion_deadline(budget);
    }
    Dag::builder(dag_id()).add_job(plan).build().unwrap()
}

/// Two-job DAG whose first job has been pending since `created_ago`, with
/// the given start budget
pub fn dag_with_pending_job(budget: Option<Duration>, created_ago: Duration) -> Dag {
    let created_at = Utc::now() - chrono::Duration::from_std(created_ago).unwrap();
    let mut plan = JobExecutionPlan::new("g1", "f1", 100, "job1").with_created_at(created_at);
    if let Some(budget) = budget {
        plan = plan.with_start_deadline(budget);
    }
    Dag::builder(dag_id())
        .add_job(plan)
        .add_job(JobExecutionPlan::new("g1", "f1", 100, "job2"))
        .add_dependency("job1", "job2")
        .build()
        .unwrap()
}
