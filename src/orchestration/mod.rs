//! # Dag Action Orchestration
//!
//! The shared processing protocol for DAG lifecycle actions and its concrete
//! deadline-enforcement instance.
//!
//! ## Architecture
//!
//! A dispatcher (out of scope) pulls a [`DagTask`] from the durable action
//! queue and routes it to the matching processor. Every processor follows the
//! same two-phase [`DagProc`] template: *initialize* loads current state from
//! the store, *act* revalidates relevance against the store and then mutates.
//! The store is the only synchronization point between concurrent processors;
//! the relevance check is what makes at-least-once delivery safe.
//!
//! ## Core Components
//!
//! - **DagTask**: dispatch-level wrapper around exactly one action
//! - **DagProc**: the two-phase template contract shared by all action kinds
//! - **Relevance validation**: the ordered DAG-presence and action-pending
//!   checks that turn duplicates into no-ops
//! - **DeadlineEnforcementProc**: the deadline action family, parameterized
//!   by a [`DeadlineEnforcer`] strategy selected at routing time

pub mod dag_proc;
pub mod dag_task;
pub mod deadline;
pub mod relevance;

pub use dag_proc::{ActOutcome, DagProc};
pub use dag_task::DagTask;
pub use deadline::{
    CompletionDeadlineEnforcer, DeadlineEnforcementProc, DeadlineEnforcer, StartDeadlineEnforcer,
    DEFAULT_COMPLETION_DEADLINE_KEY, DEFAULT_START_DEADLINE_KEY,
};
pub use relevance::{validate_action_relevance, Relevance};
