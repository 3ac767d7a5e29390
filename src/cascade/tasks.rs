//! Task Cascade Resolver
//!
//! Same shape as check resolution but simpler: tasks are deduplicated only
//! by template identity (a template contributed by several levels applies
//! once), and every task is filtered by script/platform compatibility.

use crate::cascade::{retire_action, Retirement};
use crate::domain::{Agent, SyncStatus, Task};
use crate::script::ScriptGate;
use crate::types::{AgentId, TaskId};
use std::collections::HashSet;

/// Intended mutations produced by task resolution.
#[derive(Debug, Clone, Default)]
pub struct TaskPlan {
    pub agent: AgentId,
    /// Accepted templates in stack order.
    pub resolved: Vec<Task>,
    /// Accepted templates not yet materialized on the agent.
    pub creations: Vec<Task>,
    /// Managed tasks whose parent template fell out of the resolved set.
    pub retirements: Vec<Retirement<TaskId>>,
    /// Pending-deletion tasks whose parent template reappeared.
    pub revivals: Vec<TaskId>,
}

impl TaskPlan {
    /// True when applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.creations.is_empty() && self.retirements.is_empty() && self.revivals.is_empty()
    }
}

/// Resolve the effective task set for one agent.
///
/// `layers` must contain only active policies' tasks, in stack order (agent,
/// site, client, default).
pub fn resolve_tasks(
    agent: &Agent,
    agent_tasks: &[Task],
    layers: &[Vec<Task>],
    gate: &dyn ScriptGate,
) -> TaskPlan {
    let prior_parents: HashSet<TaskId> = agent_tasks
        .iter()
        .filter(|task| task.managed_by_policy)
        .filter_map(|task| task.parent_task)
        .collect();

    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut resolved: Vec<Task> = Vec::new();
    for task in layers.iter().flatten() {
        if !seen.insert(task.id) {
            continue;
        }
        if gate.is_supported(task.script.shell, agent.platform) {
            resolved.push(task.clone());
        }
    }

    let accepted: HashSet<TaskId> = resolved.iter().map(|task| task.id).collect();

    let mut retirements = Vec::new();
    let mut revivals = Vec::new();
    for task in agent_tasks.iter().filter(|task| task.managed_by_policy) {
        let parent_accepted = task
            .parent_task
            .is_some_and(|parent| accepted.contains(&parent));
        if parent_accepted {
            if task.sync_status == SyncStatus::PendingDeletion {
                revivals.push(task.id);
            }
        } else if task.sync_status != SyncStatus::PendingDeletion {
            retirements.push(Retirement {
                id: task.id,
                action: retire_action(task.sync_status),
            });
        }
    }

    let creations: Vec<Task> = resolved
        .iter()
        .filter(|task| !prior_parents.contains(&task.id))
        .cloned()
        .collect();

    TaskPlan {
        agent: agent.id,
        resolved,
        creations,
        retirements,
        revivals,
    }
}
