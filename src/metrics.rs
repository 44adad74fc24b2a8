//! # Processing Engine Metrics
//!
//! Per-action-kind counters for the DAG-action processing engine, plus a
//! broadcast stream of metric events for subscribers.
//!
//! ## Signals
//!
//! - **initialized**: one mark per `initialize` attempt, tagged with whether
//!   the state load succeeded.
//! - **acted**: one mark per completed `act` invocation, tagged with whether
//!   real enforcement was attempted (`true`) or the action short-circuited as
//!   moot (`false`). Operators use the tag to distinguish "deadline actions
//!   delivered" from "deadline actions that actually fired".
//! - **deadline violations**: one mark per violation an enforcement hook
//!   found and corrected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::models::DagActionType;

/// One recorded metric observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricEvent {
    pub action_type: DagActionType,
    pub signal: MetricSignal,
    pub recorded_at: DateTime<Utc>,
}

/// Which counter an event incremented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSignal {
    /// State load attempted, tagged with success
    Initialized { succeeded: bool },
    /// `act` completed, tagged with enforced-vs-moot
    Acted { enforced: bool },
    /// An enforcement hook corrected a deadline violation
    DeadlineViolation,
}

#[derive(Debug)]
struct MetricsInner {
    initialized: DashMap<(DagActionType, bool), u64>,
    acted: DashMap<(DagActionType, bool), u64>,
    deadline_violations: DashMap<DagActionType, u64>,
    events: broadcast::Sender<MetricEvent>,
}

/// Counter-style metrics sink for processed DAG actions.
///
/// Cheaply clonable; clones share the same counters. Subscribers receive
/// every recorded event; publishing with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct DagProcEngineMetrics {
    inner: Arc<MetricsInner>,
}

impl DagProcEngineMetrics {
    /// Create a sink with the given broadcast channel capacity
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(MetricsInner {
                initialized: DashMap::new(),
                acted: DashMap::new(),
                deadline_violations: DashMap::new(),
                events,
            }),
        }
    }

    /// Record one `initialize` attempt for the action kind
    pub fn mark_action_initialized(&self, action_type: DagActionType, succeeded: bool) {
        *self
            .inner
            .initialized
            .entry((action_type, succeeded))
            .or_insert(0) += 1;
        self.publish(action_type, MetricSignal::Initialized { succeeded });
    }

    /// Record one completed `act` invocation for the action kind
    pub fn mark_action_acted(&self, action_type: DagActionType, enforced: bool) {
        *self
            .inner
            .acted
            .entry((action_type, enforced))
            .or_insert(0) += 1;
        self.publish(action_type, MetricSignal::Acted { enforced });
    }

    /// Record one corrected deadline violation for the action kind
    pub fn mark_deadline_violation(&self, action_type: DagActionType) {
        *self
            .inner
            .deadline_violations
            .entry(action_type)
            .or_insert(0) += 1;
        self.publish(action_type, MetricSignal::DeadlineViolation);
    }

    pub fn initialized_count(&self, action_type: DagActionType, succeeded: bool) -> u64 {
        self.inner
            .initialized
            .get(&(action_type, succeeded))
            .map_or(0, |count| *count)
    }

    pub fn acted_count(&self, action_type: DagActionType, enforced: bool) -> u64 {
        self.inner
            .acted
            .get(&(action_type, enforced))
            .map_or(0, |count| *count)
    }

    pub fn deadline_violation_count(&self, action_type: DagActionType) -> u64 {
        self.inner
            .deadline_violations
            .get(&action_type)
            .map_or(0, |count| *count)
    }

    /// Subscribe to the stream of recorded metric events
    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.inner.events.subscribe()
    }

    fn publish(&self, action_type: DagActionType, signal: MetricSignal) {
        let event = MetricEvent {
            action_type,
            signal,
            recorded_at: Utc::now(),
        };
        // send() errors only when there are no subscribers, which is fine
        let _ = self.inner.events.send(event);
    }
}

impl Default for DagProcEngineMetrics {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = DagProcEngineMetrics::default();
        assert_eq!(
            metrics.acted_count(DagActionType::EnforceStartDeadline, true),
            0
        );
        assert_eq!(
            metrics.initialized_count(DagActionType::EnforceStartDeadline, false),
            0
        );
        assert_eq!(
            metrics.deadline_violation_count(DagActionType::EnforceStartDeadline),
            0
        );
    }

    #[test]
    fn test_marks_increment_tagged_counters() {
        let metrics = DagProcEngineMetrics::default();
        let kind = DagActionType::EnforceCompletionDeadline;

        metrics.mark_action_acted(kind, true);
        metrics.mark_action_acted(kind, true);
        metrics.mark_action_acted(kind, false);
        metrics.mark_deadline_violation(kind);

        assert_eq!(metrics.acted_count(kind, true), 2);
        assert_eq!(metrics.acted_count(kind, false), 1);
        assert_eq!(metrics.deadline_violation_count(kind), 1);
        // other kinds are untouched
        assert_eq!(metrics.acted_count(DagActionType::Kill, true), 0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = DagProcEngineMetrics::default();
        let clone = metrics.clone();

        clone.mark_action_initialized(DagActionType::Launch, true);
        assert_eq!(metrics.initialized_count(DagActionType::Launch, true), 1);
    }

    #[test]
    fn test_subscribers_receive_events() {
        let metrics = DagProcEngineMetrics::default();
        let mut receiver = metrics.subscribe();

        metrics.mark_action_acted(DagActionType::EnforceStartDeadline, false);

        let event = tokio_test::block_on(receiver.recv()).unwrap();
        assert_eq!(event.action_type, DagActionType::EnforceStartDeadline);
        assert_eq!(event.signal, MetricSignal::Acted { enforced: false });
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let metrics = DagProcEngineMetrics::new(8);
        metrics.mark_action_acted(DagActionType::Resume, true);
        assert_eq!(metrics.acted_count(DagActionType::Resume, true), 1);
    }
}
