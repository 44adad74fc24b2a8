//! # Job Execution Plans
//!
//! One node of a compiled DAG: job identity, current execution state, and the
//! optional time budgets the deadline-enforcement processors act on.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution state of one job node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Job is compiled but has not started executing
    Pending,
    /// Job is currently executing
    Running,
    /// Job completed successfully
    Complete,
    /// Job failed with an error
    Failed,
    /// Job was cancelled (operator kill or deadline enforcement)
    Cancelled,
}

impl JobState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }

    /// Check if the job still occupies the flow (pending or running)
    pub fn is_live(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "complete" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid job state: {s}")),
        }
    }
}

/// One DAG node: a job's identity, state, and time budgets.
///
/// Topology is fixed at flow compilation; only `state` and the execution
/// timestamps change over a plan's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecutionPlan {
    job_name: String,
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
    state: JobState,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    start_deadline: Option<Duration>,
    completion_deadline: Option<Duration>,
}

impl JobExecutionPlan {
    pub fn new(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
        job_name: impl Into<String>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            flow_group: flow_group.into(),
            flow_name: flow_name.into(),
            flow_execution_id,
            state: JobState::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            start_deadline: None,
            completion_deadline: None,
        }
    }

    /// Set the budget within which the job must leave `Pending`
    pub fn with_start_deadline(mut self, budget: Duration) -> Self {
        self.start_deadline = Some(budget);
        self
    }

    /// Set the budget within which a started job must finish
    pub fn with_completion_deadline(mut self, budget: Duration) -> Self {
        self.completion_deadline = Some(budget);
        self
    }

    pub fn with_state(mut self, state: JobState) -> Self {
        self.transition_to(state);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Apply a state transition, stamping execution timestamps as the job
    /// enters running or terminal states.
    pub fn transition_to(&mut self, state: JobState) {
        if state == JobState::Running && self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        if state.is_terminal() && self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
        self.state = state;
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn flow_group(&self) -> &str {
        &self.flow_group
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn flow_execution_id(&self) -> i64 {
        self.flow_execution_id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn start_deadline(&self) -> Option<Duration> {
        self.start_deadline
    }

    pub fn completion_deadline(&self) -> Option<Duration> {
        self.completion_deadline
    }
}
