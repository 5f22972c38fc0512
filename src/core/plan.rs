//! Decomposition plans: sub-task descriptors and the validated DAG.
//!
//! A planner emits [`SubTaskSpec`] descriptors with local ids and
//! `depends_on` edges. [`Plan::from_specs`] materializes them into
//! [`SubTask`]s scoped under the parent id and rejects malformed graphs.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};

use crate::core::task::{Task, TaskId};
use crate::elog_warn;
use crate::error::{Error, Result};

/// A sub-task descriptor as produced by a planner.
///
/// `id` and `depends_on` use plan-local names; the engine scopes them
/// under the parent task id when the plan is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTaskSpec {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default, alias = "dependsOn")]
    pub depends_on: Vec<String>,
}

fn default_priority() -> i32 {
    1
}

impl SubTaskSpec {
    pub fn new(id: &str, description: &str, priority: i32, depends_on: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            requirements: Vec::new(),
            constraints: Vec::new(),
            priority,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// A materialized sub-task: the scoped [`Task`] plus its plan-local
/// identity and dependency set.
#[derive(Debug, Clone)]
pub struct SubTask {
    pub task: Task,
    pub local_id: String,
    pub depends_on: BTreeSet<String>,
}

/// A validated, acyclic set of sub-tasks under one parent.
#[derive(Debug, Clone)]
pub struct Plan {
    pub parent_id: TaskId,
    pub sub_tasks: Vec<SubTask>,
}

impl Plan {
    /// Build a plan from planner descriptors.
    ///
    /// Descriptors beyond `max_sub_tasks` are dropped with a warning.
    /// Duplicate local ids, self-dependencies, references to unknown
    /// (or dropped) sub-tasks, and dependency cycles are rejected.
    pub fn from_specs(
        parent: &Task,
        mut specs: Vec<SubTaskSpec>,
        max_sub_tasks: usize,
    ) -> Result<Self> {
        if specs.len() > max_sub_tasks {
            elog_warn!(
                "task {} decomposed into {} sub-tasks, truncating to {}",
                parent.id.short(),
                specs.len(),
                max_sub_tasks
            );
            specs.truncate(max_sub_tasks);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.id.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate sub-task id '{}' in plan for task {}",
                    spec.id, parent.id
                )));
            }
        }

        for spec in &specs {
            for dep in &spec.depends_on {
                if dep == &spec.id {
                    return Err(Error::Validation(format!(
                        "sub-task '{}' depends on itself",
                        spec.id
                    )));
                }
                if !seen.contains(dep.as_str()) {
                    return Err(Error::Validation(format!(
                        "sub-task '{}' depends on unknown sub-task '{}'",
                        spec.id, dep
                    )));
                }
            }
        }

        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes = HashMap::new();
        for spec in &specs {
            nodes.insert(spec.id.as_str(), graph.add_node(spec.id.as_str()));
        }
        for spec in &specs {
            for dep in &spec.depends_on {
                graph.add_edge(nodes[dep.as_str()], nodes[spec.id.as_str()], ());
            }
        }
        if is_cyclic_directed(&graph) {
            return Err(Error::Validation(format!(
                "dependency cycle in plan for task {}",
                parent.id
            )));
        }

        let sub_tasks = specs
            .into_iter()
            .map(|spec| {
                let task = Task::with_id(parent.id.child(&spec.id), spec.description)
                    .with_requirements(spec.requirements)
                    .with_constraints(spec.constraints)
                    .with_priority(spec.priority);
                SubTask {
                    task,
                    local_id: spec.id,
                    depends_on: spec.depends_on.into_iter().collect(),
                }
            })
            .collect();

        Ok(Self {
            parent_id: parent.id.clone(),
            sub_tasks,
        })
    }

    pub fn len(&self) -> usize {
        self.sub_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_tasks.is_empty()
    }

    /// Sub-tasks whose dependencies are all satisfied and which have not
    /// been dispatched yet, in plan order.
    pub fn ready<'a>(
        &'a self,
        completed: &BTreeSet<String>,
        dispatched: &BTreeSet<String>,
    ) -> Vec<&'a SubTask> {
        self.sub_tasks
            .iter()
            .filter(|st| {
                !dispatched.contains(&st.local_id)
                    && st.depends_on.iter().all(|dep| completed.contains(dep))
            })
            .collect()
    }
}
