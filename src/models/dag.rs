//! # Dag
//!
//! An ordered, acyclic graph of [`JobExecutionPlan`] nodes representing one
//! compiled pipeline instance. Identity and topology are fixed at build time;
//! node states transition over the DAG's lifetime.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{DagFlowError, Result};
use crate::models::dag_action::DagId;
use crate::models::job_execution_plan::JobExecutionPlan;

/// One compiled pipeline instance.
///
/// Nodes are keyed by job name and iterated in topological order. Mutation is
/// limited to node state transitions; topology never changes after
/// [`DagBuilder::build`].
#[derive(Debug, Clone)]
pub struct Dag {
    id: DagId,
    graph: DiGraph<JobExecutionPlan, ()>,
    order: Vec<NodeIndex>,
    by_name: HashMap<String, NodeIndex>,
}

impl Dag {
    pub fn builder(id: DagId) -> DagBuilder {
        DagBuilder {
            id,
            graph: DiGraph::new(),
            by_name: HashMap::new(),
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> &DagId {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a node by job name
    pub fn node(&self, job_name: &str) -> Option<&JobExecutionPlan> {
        self.by_name.get(job_name).map(|idx| &self.graph[*idx])
    }

    /// Look up a node by job name for a state transition
    pub fn node_mut(&mut self, job_name: &str) -> Option<&mut JobExecutionPlan> {
        let idx = *self.by_name.get(job_name)?;
        Some(&mut self.graph[idx])
    }

    /// Iterate nodes in topological order
    pub fn nodes(&self) -> impl Iterator<Item = &JobExecutionPlan> + '_ {
        self.order.iter().map(|idx| &self.graph[*idx])
    }

    /// Iterate nodes that are still pending or running
    pub fn live_jobs(&self) -> impl Iterator<Item = &JobExecutionPlan> + '_ {
        self.nodes().filter(|plan| plan.state().is_live())
    }

    /// Check whether every node has reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.nodes().all(|plan| plan.state().is_terminal())
    }
}

/// Builder enforcing the structural invariants of a [`Dag`]: unique job
/// names, dependency endpoints that exist, and acyclicity.
#[derive(Debug)]
pub struct DagBuilder {
    id: DagId,
    graph: DiGraph<JobExecutionPlan, ()>,
    by_name: HashMap<String, NodeIndex>,
    edges: Vec<(String, String)>,
}

impl DagBuilder {
    pub fn add_job(mut self, plan: JobExecutionPlan) -> Self {
        let name = plan.job_name().to_string();
        let idx = self.graph.add_node(plan);
        // Duplicate names are detected at build(); last insert wins here
        self.by_name.insert(name, idx);
        self
    }

    pub fn add_dependency(mut self, parent: &str, child: &str) -> Self {
        self.edges.push((parent.to_string(), child.to_string()));
        self
    }

    pub fn build(self) -> Result<Dag> {
        let DagBuilder {
            id,
            mut graph,
            by_name,
            edges,
        } = self;

        if by_name.len() != graph.node_count() {
            return Err(DagFlowError::InvalidDag(format!(
                "dag {id} contains duplicate job names"
            )));
        }

        for (parent, child) in &edges {
            let parent_idx = by_name.get(parent).ok_or_else(|| {
                DagFlowError::InvalidDag(format!(
                    "dag {id} references unknown dependency parent {parent}"
                ))
            })?;
            let child_idx = by_name.get(child).ok_or_else(|| {
                DagFlowError::InvalidDag(format!(
                    "dag {id} references unknown dependency child {child}"
                ))
            })?;
            graph.add_edge(*parent_idx, *child_idx, ());
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let job = graph[cycle.node_id()].job_name().to_string();
            DagFlowError::InvalidDag(format!("dag {id} contains a cycle through job {job}"))
        })?;

        Ok(Dag {
            id,
            graph,
            order,
            by_name,
        })
    }
}
