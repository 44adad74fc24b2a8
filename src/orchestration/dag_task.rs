//! # Dag Task
//!
//! Dispatch-level wrapper around exactly one [`DagAction`]. A task carries no
//! mutable state of its own and is disposable after one processing attempt;
//! redelivery after a failure produces a fresh task for the same action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DagAction, DagId};

/// One unit of work pulled from the action queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagTask {
    action: DagAction,
    enqueued_at: DateTime<Utc>,
}

impl DagTask {
    pub fn new(action: DagAction) -> Self {
        Self {
            action,
            enqueued_at: Utc::now(),
        }
    }

    pub fn dag_action(&self) -> &DagAction {
        &self.action
    }

    /// Identity-derived id of the DAG this task addresses
    pub fn dag_id(&self) -> DagId {
        self.action.dag_id()
    }

    pub fn enqueued_at(&self) -> DateTime<Utc> {
        self.enqueued_at
    }
}
