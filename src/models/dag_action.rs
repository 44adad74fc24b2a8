//! # Dag Actions
//!
//! Identity descriptors for requested lifecycle operations on a DAG or one of
//! its jobs. A `DagAction` is immutable once created; equality over the full
//! tuple means two actions with the same tuple are the same logical action.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle operation kinds delivered through the action queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DagActionType {
    /// Launch a compiled flow
    Launch,
    /// Kill a running flow or job
    Kill,
    /// Resume a previously failed flow
    Resume,
    /// Retry a failed job
    Retry,
    /// Enforce the start deadline of a job or flow
    EnforceStartDeadline,
    /// Enforce the completion deadline of a job or flow
    EnforceCompletionDeadline,
}

impl DagActionType {
    /// Check if this action kind belongs to the deadline-enforcement family
    pub fn is_deadline(&self) -> bool {
        matches!(
            self,
            Self::EnforceStartDeadline | Self::EnforceCompletionDeadline
        )
    }
}

impl fmt::Display for DagActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Launch => write!(f, "launch"),
            Self::Kill => write!(f, "kill"),
            Self::Resume => write!(f, "resume"),
            Self::Retry => write!(f, "retry"),
            Self::EnforceStartDeadline => write!(f, "enforce_start_deadline"),
            Self::EnforceCompletionDeadline => write!(f, "enforce_completion_deadline"),
        }
    }
}

impl std::str::FromStr for DagActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launch" => Ok(Self::Launch),
            "kill" => Ok(Self::Kill),
            "resume" => Ok(Self::Resume),
            "retry" => Ok(Self::Retry),
            "enforce_start_deadline" => Ok(Self::EnforceStartDeadline),
            "enforce_completion_deadline" => Ok(Self::EnforceCompletionDeadline),
            _ => Err(format!("Invalid dag action type: {s}")),
        }
    }
}

/// Identity of one compiled flow execution, derived deterministically from
/// (flow group, flow name, flow execution id).
///
/// The id is derived, never parsed back: underscores inside group or name
/// make the canonical string ambiguous in the reverse direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DagId(String);

impl DagId {
    /// Derive the canonical id for a flow execution
    pub fn from_parts(flow_group: &str, flow_name: &str, flow_execution_id: i64) -> Self {
        Self(format!("{flow_group}_{flow_name}_{flow_execution_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable descriptor of one requested lifecycle operation.
///
/// `job_name` of `None` addresses the flow as a whole; `Some` addresses a
/// single job within it. The persisted action record keyed by this exact
/// tuple is the source of truth for whether the action is still relevant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagAction {
    flow_group: String,
    flow_name: String,
    flow_execution_id: i64,
    job_name: Option<String>,
    action_type: DagActionType,
}

impl DagAction {
    pub fn new(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
        job_name: Option<String>,
        action_type: DagActionType,
    ) -> Self {
        Self {
            flow_group: flow_group.into(),
            flow_name: flow_name.into(),
            flow_execution_id,
            job_name,
            action_type,
        }
    }

    /// Create an action addressing the flow as a whole
    pub fn for_flow(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
        action_type: DagActionType,
    ) -> Self {
        Self::new(flow_group, flow_name, flow_execution_id, None, action_type)
    }

    /// Create an action addressing one job within the flow
    pub fn for_job(
        flow_group: impl Into<String>,
        flow_name: impl Into<String>,
        flow_execution_id: i64,
        job_name: impl Into<String>,
        action_type: DagActionType,
    ) -> Self {
        Self::new(
            flow_group,
            flow_name,
            flow_execution_id,
            Some(job_name.into()),
            action_type,
        )
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

    pub fn job_name(&self) -> Option<&str> {
        self.job_name.as_deref()
    }

    pub fn action_type(&self) -> DagActionType {
        self.action_type
    }

    /// Derive the id of the DAG this action addresses
    pub fn dag_id(&self) -> DagId {
        DagId::from_parts(&self.flow_group, &self.flow_name, self.flow_execution_id)
    }
}

impl fmt::Display for DagAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.job_name {
            Some(job) => write!(
                f,
                "{} for flow {}/{} execution {} job {}",
                self.action_type, self.flow_group, self.flow_name, self.flow_execution_id, job
            ),
            None => write!(
                f,
                "{} for flow {}/{} execution {}",
                self.action_type, self.flow_group, self.flow_name, self.flow_execution_id
            ),
        }
    }
}
