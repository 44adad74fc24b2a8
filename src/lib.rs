#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Dagflow Core
//!
//! DAG-action processing core for distributed workflow orchestration: the
//! mechanism by which discrete lifecycle actions (launch, kill, resume,
//! retry, enforce-deadline) are applied, exactly-once-in-effect, against a
//! persisted DAG representing a multi-step job pipeline.
//!
//! ## Overview
//!
//! The hard part is not any single action's business logic but the shared
//! protocol: every action is validated against current persisted state before
//! acting, safe to re-run if re-delivered, and observable via metrics
//! regardless of outcome. This crate provides that protocol — the two-phase
//! [`orchestration::DagProc`] template, the relevance validation that makes
//! at-least-once delivery idempotent, and the deadline-enforcement action
//! family as its concrete instance.
//!
//! The durable action queue, the persistence backend, and the business rules
//! for non-deadline action kinds are external collaborators; this crate
//! specifies their contracts ([`store::DagStateStore`], [`metrics`]) and
//! nothing more.
//!
//! ## Module Organization
//!
//! - [`models`] - Action descriptors, job execution plans, and the DAG
//! - [`store`] - State-store contract plus an in-memory witness
//! - [`orchestration`] - The processor template and the deadline family
//! - [`metrics`] - Per-action-kind engine counters
//! - [`config`] - Opaque settings threaded through to enforcement hooks
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dagflow_core::config::DagProcSettings;
//! use dagflow_core::metrics::DagProcEngineMetrics;
//! use dagflow_core::models::{DagAction, DagActionType};
//! use dagflow_core::orchestration::{DagProc, DagTask, DeadlineEnforcementProc};
//! use dagflow_core::store::InMemoryDagStateStore;
//!
//! # async fn example() -> dagflow_core::Result<()> {
//! let store = InMemoryDagStateStore::new();
//! let metrics = DagProcEngineMetrics::default();
//!
//! let action =
//!     DagAction::for_job("g1", "f1", 100, "job1", DagActionType::EnforceCompletionDeadline);
//! let proc = DeadlineEnforcementProc::for_task(DagTask::new(action), DagProcSettings::empty())?;
//!
//! let outcome = proc.process(&store, &metrics).await?;
//! println!("processed: enforced={}", outcome.is_enforced());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestration;
pub mod store;

pub use config::DagProcSettings;
pub use error::{DagFlowError, Result};
pub use metrics::{DagProcEngineMetrics, MetricEvent, MetricSignal};
pub use models::{Dag, DagAction, DagActionType, DagBuilder, DagId, JobExecutionPlan, JobState};
pub use orchestration::{
    validate_action_relevance, ActOutcome, CompletionDeadlineEnforcer, DagProc, DagTask,
    DeadlineEnforcementProc, DeadlineEnforcer, Relevance, StartDeadlineEnforcer,
};
pub use store::{DagStateStore, InMemoryDagStateStore};
