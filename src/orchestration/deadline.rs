//! # Deadline Enforcement Processor
//!
//! Specialization of the [`DagProc`] template for the deadline action family:
//! after validating that the DAG is still live and the action still pending,
//! it invokes a pluggable [`DeadlineEnforcer`] strategy — kill an overrunning
//! job, or kill a flow whose job never started. The strategy is the only
//! place deadline business logic lives; the processor owns the protocol.
//!
//! Strategy selection happens once, at task-routing time, from the action
//! kind ([`DeadlineEnforcementProc::for_task`]); there is no subclass
//! polymorphism anywhere in the dispatch path.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::DagProcSettings;
use crate::error::{DagFlowError, Result};
use crate::metrics::DagProcEngineMetrics;
use crate::models::{Dag, DagAction, DagActionType, JobExecutionPlan, JobState};
use crate::orchestration::dag_proc::{ActOutcome, DagProc};
use crate::orchestration::dag_task::DagTask;
use crate::orchestration::relevance::validate_action_relevance;
use crate::store::DagStateStore;

/// Settings key for the start-deadline budget applied when a plan carries none
pub const DEFAULT_START_DEADLINE_KEY: &str = "deadlines.default_start_deadline_secs";
/// Settings key for the completion-deadline budget applied when a plan carries none
pub const DEFAULT_COMPLETION_DEADLINE_KEY: &str = "deadlines.default_completion_deadline_secs";

/// Kind-specific corrective action for one deadline family member.
///
/// The hook mutates persisted state through the store and, as its final step,
/// removes the action record — that removal is what turns any redelivered
/// duplicate into a moot no-op at the relevance check.
#[async_trait]
pub trait DeadlineEnforcer: Send + Sync {
    async fn enforce_deadline(
        &self,
        store: &dyn DagStateStore,
        action: &DagAction,
        dag: &Dag,
        metrics: &DagProcEngineMetrics,
    ) -> Result<()>;
}

/// Processor applying one deadline-enforcement action to a persisted DAG
pub struct DeadlineEnforcementProc {
    task: DagTask,
    settings: DagProcSettings,
    enforcer: Box<dyn DeadlineEnforcer>,
}

impl DeadlineEnforcementProc {
    /// Route a task to the enforcement strategy matching its action kind.
    ///
    /// Non-deadline kinds are rejected; their processors live with their
    /// business rules, outside this crate.
    pub fn for_task(task: DagTask, settings: DagProcSettings) -> Result<Self> {
        let enforcer: Box<dyn DeadlineEnforcer> = match task.dag_action().action_type() {
            DagActionType::EnforceStartDeadline => {
                Box::new(StartDeadlineEnforcer::new(settings.clone()))
            }
            DagActionType::EnforceCompletionDeadline => {
                Box::new(CompletionDeadlineEnforcer::new(settings.clone()))
            }
            other => return Err(DagFlowError::UnsupportedAction(other)),
        };
        Ok(Self {
            task,
            settings,
            enforcer,
        })
    }

    /// Build a processor around a custom enforcement strategy
    pub fn with_enforcer(
        task: DagTask,
        settings: DagProcSettings,
        enforcer: Box<dyn DeadlineEnforcer>,
    ) -> Self {
        Self {
            task,
            settings,
            enforcer,
        }
    }

    /// The settings threaded through at construction, uninterpreted
    pub fn settings(&self) -> &DagProcSettings {
        &self.settings
    }
}

impl fmt::Debug for DeadlineEnforcementProc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeadlineEnforcementProc")
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DagProc for DeadlineEnforcementProc {
    type State = Option<Dag>;

    fn dag_action(&self) -> &DagAction {
        self.task.dag_action()
    }

    async fn initialize(&self, store: &dyn DagStateStore) -> Result<Option<Dag>> {
        store.get_dag(&self.dag_id()).await
    }

    #[instrument(skip_all, fields(dag_id = %self.dag_id(), action_type = %self.dag_action().action_type()))]
    async fn act(
        &self,
        store: &dyn DagStateStore,
        dag: Option<Dag>,
        metrics: &DagProcEngineMetrics,
    ) -> Result<ActOutcome> {
        let action = self.task.dag_action();
        info!(dag_id = %self.dag_id(), "Request to enforce {} for dag", action.action_type());

        let relevance = validate_action_relevance(store, action, dag.as_ref()).await?;
        let outcome = match dag {
            Some(ref dag) if relevance.is_relevant() => {
                self.enforcer
                    .enforce_deadline(store, action, dag, metrics)
                    .await?;
                ActOutcome::Enforced
            }
            _ => ActOutcome::Moot,
        };

        metrics.mark_action_acted(action.action_type(), outcome.is_enforced());
        Ok(outcome)
    }
}

/// Kills a flow whose addressed job failed to leave `Pending` within its
/// start budget. A job that started just before the timer fired is treated
/// as satisfied; the action record is removed either way.
pub struct StartDeadlineEnforcer {
    settings: DagProcSettings,
}

impl StartDeadlineEnforcer {
    pub fn new(settings: DagProcSettings) -> Self {
        Self { settings }
    }

    fn default_budget(&self) -> Option<Duration> {
        self.settings.get_duration_secs(DEFAULT_START_DEADLINE_KEY)
    }
}

#[async_trait]
impl DeadlineEnforcer for StartDeadlineEnforcer {
    async fn enforce_deadline(
        &self,
        store: &dyn DagStateStore,
        action: &DagAction,
        dag: &Dag,
        metrics: &DagProcEngineMetrics,
    ) -> Result<()> {
        let now = Utc::now();
        let targets = target_plans(dag, action.job_name());
        if targets.is_empty() {
            warn!(
                dag_id = %dag.id(),
                job_name = action.job_name(),
                "Deadline action addresses a job not present in the dag"
            );
        }

        let violation = targets.iter().find(|plan| {
            plan.state() == JobState::Pending
                && budget_exceeded(
                    plan.created_at(),
                    plan.start_deadline().or_else(|| self.default_budget()),
                    now,
                )
        });

        if let Some(plan) = violation {
            warn!(
                dag_id = %dag.id(),
                job_name = plan.job_name(),
                "Job did not start within its deadline; killing flow"
            );
            metrics.mark_deadline_violation(action.action_type());
            cancel_live_jobs(store, dag).await?;
        } else {
            debug!(dag_id = %dag.id(), "Start deadline satisfied; no enforcement needed");
        }

        store.delete_dag_action(action).await?;
        Ok(())
    }
}

/// Kills jobs that have been running past their completion budget. With no
/// job name the whole flow is inspected and every overrunning job is killed;
/// the action record is removed either way.
pub struct CompletionDeadlineEnforcer {
    settings: DagProcSettings,
}

impl CompletionDeadlineEnforcer {
    pub fn new(settings: DagProcSettings) -> Self {
        Self { settings }
    }

    fn default_budget(&self) -> Option<Duration> {
        self.settings
            .get_duration_secs(DEFAULT_COMPLETION_DEADLINE_KEY)
    }
}

#[async_trait]
impl DeadlineEnforcer for CompletionDeadlineEnforcer {
    async fn enforce_deadline(
        &self,
        store: &dyn DagStateStore,
        action: &DagAction,
        dag: &Dag,
        metrics: &DagProcEngineMetrics,
    ) -> Result<()> {
        let now = Utc::now();
        let targets = target_plans(dag, action.job_name());
        if targets.is_empty() {
            warn!(
                dag_id = %dag.id(),
                job_name = action.job_name(),
                "Deadline action addresses a job not present in the dag"
            );
        }

        let overrunning: Vec<String> = targets
            .iter()
            .filter(|plan| plan.state() == JobState::Running)
            .filter(|plan| match plan.started_at() {
                Some(started) => budget_exceeded(
                    started,
                    plan.completion_deadline().or_else(|| self.default_budget()),
                    now,
                ),
                None => false,
            })
            .map(|plan| plan.job_name().to_string())
            .collect();

        for job_name in &overrunning {
            warn!(
                dag_id = %dag.id(),
                job_name = %job_name,
                "Job exceeded its completion deadline; killing job"
            );
            metrics.mark_deadline_violation(action.action_type());
            store
                .update_job_state(dag.id(), job_name, JobState::Cancelled)
                .await?;
        }

        if overrunning.is_empty() {
            debug!(dag_id = %dag.id(), "Completion deadline satisfied; no enforcement needed");
        }

        store.delete_dag_action(action).await?;
        Ok(())
    }
}

/// Plans addressed by an action: the named job, or every node for a
/// flow-scoped action
fn target_plans<'a>(dag: &'a Dag, job_name: Option<&str>) -> Vec<&'a JobExecutionPlan> {
    match job_name {
        Some(job) => dag.node(job).into_iter().collect(),
        None => dag.nodes().collect(),
    }
}

fn budget_exceeded(base: DateTime<Utc>, budget: Option<Duration>, now: DateTime<Utc>) -> bool {
    let Some(budget) = budget else {
        return false;
    };
    // A budget too large for chrono to represent can never be exceeded
    chrono::Duration::from_std(budget)
        .map(|budget| now >= base + budget)
        .unwrap_or(false)
}

async fn cancel_live_jobs(store: &dyn DagStateStore, dag: &Dag) -> Result<()> {
    let live: Vec<String> = dag
        .live_jobs()
        .map(|plan| plan.job_name().to_string())
        .collect();
    for job_name in live {
        store
            .update_job_state(dag.id(), &job_name, JobState::Cancelled)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(action_type: DagActionType) -> DagTask {
        DagTask::new(DagAction::for_job("g1", "f1", 100, "job1", action_type))
    }

    #[test]
    fn test_for_task_routes_deadline_kinds() {
        assert!(
            DeadlineEnforcementProc::for_task(
                task(DagActionType::EnforceStartDeadline),
                DagProcSettings::empty()
            )
            .is_ok()
        );
        assert!(
            DeadlineEnforcementProc::for_task(
                task(DagActionType::EnforceCompletionDeadline),
                DagProcSettings::empty()
            )
            .is_ok()
        );
    }

    #[test]
    fn test_for_task_rejects_other_kinds() {
        let err = DeadlineEnforcementProc::for_task(
            task(DagActionType::Launch),
            DagProcSettings::empty(),
        )
        .unwrap_err();
        assert_eq!(err, DagFlowError::UnsupportedAction(DagActionType::Launch));
    }

    #[test]
    fn test_settings_are_threaded_through() {
        let raw = config::Config::builder()
            .set_default("deadlines.default_start_deadline_secs", 120)
            .unwrap()
            .build()
            .unwrap();
        let proc = DeadlineEnforcementProc::for_task(
            task(DagActionType::EnforceStartDeadline),
            DagProcSettings::from_config(raw),
        )
        .unwrap();

        assert_eq!(
            proc.settings().get_duration_secs(DEFAULT_START_DEADLINE_KEY),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn test_budget_exceeded() {
        let base = Utc::now();
        let later = base + chrono::Duration::seconds(90);

        assert!(budget_exceeded(base, Some(Duration::from_secs(60)), later));
        assert!(!budget_exceeded(base, Some(Duration::from_secs(120)), later));
        // no budget configured means nothing to enforce
        assert!(!budget_exceeded(base, None, later));
        // unrepresentable budgets are never exceeded
        assert!(!budget_exceeded(base, Some(Duration::MAX), later));
    }
}
