//! # Data Model
//!
//! The persisted shapes the processing core operates on: action descriptors,
//! per-job execution plans, and the compiled DAG holding them. All identity is
//! value-based; the state store remains the source of truth for liveness.

pub mod dag;
pub mod dag_action;
pub mod job_execution_plan;

pub use dag::{Dag, DagBuilder};
pub use dag_action::{DagAction, DagActionType, DagId};
pub use job_execution_plan::{JobExecutionPlan, JobState};
