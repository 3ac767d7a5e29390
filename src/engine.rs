//! Resolution engine
//!
//! Ties the pieces together: policy mutation events are reduced to per-agent
//! work items, and each agent is refreshed independently under its own lock.
//! The engine owns no dispatch mechanism; callers decide when events fire
//! and may fan the work items out across threads or a queue.

use crate::cascade::{resolve_checks, resolve_tasks, CheckLayer};
use crate::concurrency::AgentLockManager;
use crate::domain::{Agent, Policy, Task};
use crate::error::{CascadeError, StorageError};
use crate::hierarchy::{DirectoryPolicyLocator, PolicyLocator};
use crate::reconcile::{ApplyReport, Reconciler};
use crate::scope::related_agents;
use crate::script::{DefaultScriptGate, ScriptGate};
use crate::store::{CheckStore, Directory, TaskStore};
use crate::types::{AgentId, AlertTemplateId, PolicyId};
use std::sync::Arc;
use tracing::{debug, info};

/// The fields of a policy whose changes drive re-resolution, captured before
/// a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicySnapshot {
    pub active: bool,
    pub enforced: bool,
    pub alert_template: Option<AlertTemplateId>,
}

impl PolicySnapshot {
    pub fn of(policy: &Policy) -> Self {
        Self {
            active: policy.active,
            enforced: policy.enforced,
            alert_template: policy.alert_template,
        }
    }
}

/// A policy mutation the engine reacts to.
#[derive(Debug, Clone)]
pub enum PolicyEvent {
    /// Policy created or edited. `previous` is `None` for a creation.
    Saved {
        policy: PolicyId,
        previous: Option<PolicySnapshot>,
    },
    /// Policy deleted. The scope must be captured before removal (see
    /// [`Engine::capture_scope`]) since it is no longer computable after.
    Deleted { prior_scope: Vec<AgentId> },
}

/// Outcome of refreshing one agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentRefresh {
    pub agent: AgentId,
    pub checks: ApplyReport,
    pub tasks: ApplyReport,
}

/// Outcome of a fan-out pass. Failures are isolated per agent.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<AgentRefresh>,
    pub failures: Vec<(AgentId, CascadeError)>,
}

/// The resolution-and-reconciliation engine.
pub struct Engine {
    directory: Arc<dyn Directory>,
    checks: Arc<dyn CheckStore>,
    tasks: Arc<dyn TaskStore>,
    locator: Arc<dyn PolicyLocator>,
    gate: Arc<dyn ScriptGate>,
    reconciler: Reconciler,
    locks: AgentLockManager,
}

impl Engine {
    /// Build an engine with the directory-backed locator and the default
    /// script gate.
    pub fn new(
        directory: Arc<dyn Directory>,
        checks: Arc<dyn CheckStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Self {
        let locator = Arc::new(DirectoryPolicyLocator::new(directory.clone()));
        Self::with_parts(directory, checks, tasks, locator, Arc::new(DefaultScriptGate))
    }

    pub fn with_parts(
        directory: Arc<dyn Directory>,
        checks: Arc<dyn CheckStore>,
        tasks: Arc<dyn TaskStore>,
        locator: Arc<dyn PolicyLocator>,
        gate: Arc<dyn ScriptGate>,
    ) -> Self {
        let reconciler = Reconciler::new(checks.clone(), tasks.clone());
        Self {
            directory,
            checks,
            tasks,
            locator,
            gate,
            reconciler,
            locks: AgentLockManager::new(),
        }
    }

    /// Resolve and reconcile one agent under its lock.
    pub fn refresh_agent(&self, agent_id: AgentId) -> Result<AgentRefresh, CascadeError> {
        let lock = self.locks.lock_for(agent_id);
        let _guard = lock.lock();

        let agent = self
            .directory
            .agent(agent_id)?
            .ok_or(StorageError::AgentNotFound(agent_id))?;
        let stack = self.locator.locate(&agent)?;

        let check_report = self.refresh_checks(&agent, &stack)?;
        let task_report = self.refresh_tasks(&agent, &stack)?;

        debug!(agent = %agent_id, ?check_report, ?task_report, "agent refreshed");
        Ok(AgentRefresh {
            agent: agent_id,
            checks: check_report,
            tasks: task_report,
        })
    }

    fn refresh_checks(
        &self,
        agent: &Agent,
        stack: &crate::hierarchy::PolicyStack,
    ) -> Result<ApplyReport, CascadeError> {
        let layers: Vec<CheckLayer> = stack
            .active_layers()
            .map(|policy| {
                Ok(CheckLayer {
                    enforced: policy.enforced,
                    checks: self.checks.policy_checks(policy.id)?,
                })
            })
            .collect::<Result<_, StorageError>>()?;
        let agent_checks = self.checks.agent_checks(agent.id)?;
        let plan = resolve_checks(agent, &agent_checks, &layers, self.gate.as_ref());
        self.reconciler.apply_check_plan(agent, &plan)
    }

    fn refresh_tasks(
        &self,
        agent: &Agent,
        stack: &crate::hierarchy::PolicyStack,
    ) -> Result<ApplyReport, CascadeError> {
        let layers: Vec<Vec<Task>> = stack
            .active_layers()
            .map(|policy| self.tasks.policy_tasks(policy.id))
            .collect::<Result<_, StorageError>>()?;
        let agent_tasks = self.tasks.agent_tasks(agent.id)?;
        let plan = resolve_tasks(agent, &agent_tasks, &layers, self.gate.as_ref());
        self.reconciler.apply_task_plan(agent, &plan)
    }

    /// Refresh many agents as independent work items. A failure for one
    /// agent is recorded and does not stop the rest.
    pub fn refresh_agents(&self, agents: impl IntoIterator<Item = AgentId>) -> RefreshReport {
        let mut report = RefreshReport::default();
        for agent in agents {
            match self.refresh_agent(agent) {
                Ok(refresh) => report.refreshed.push(refresh),
                Err(error) => {
                    info!(%agent, %error, "agent refresh failed");
                    report.failures.push((agent, error));
                }
            }
        }
        report
    }

    /// Capture the agents currently in a policy's scope. Call before
    /// deleting the policy; feed the result to [`PolicyEvent::Deleted`].
    pub fn capture_scope(&self, policy: PolicyId) -> Result<Vec<AgentId>, CascadeError> {
        let policy = self
            .directory
            .policy(policy)?
            .ok_or(StorageError::PolicyNotFound(policy))?;
        let mut agents: Vec<AgentId> =
            related_agents(self.directory.as_ref(), &policy)?.into_iter().collect();
        agents.sort();
        Ok(agents)
    }

    /// Reduce an event to the per-agent work items it implies, deduplicated
    /// and sorted for deterministic dispatch. An edit that changed neither
    /// `active` nor `enforced` implies no cascade work; an
    /// alert-template-only change belongs to the template cache, not here.
    pub fn affected_agents(&self, event: &PolicyEvent) -> Result<Vec<AgentId>, CascadeError> {
        match event {
            PolicyEvent::Saved { policy, previous } => {
                let current = self
                    .directory
                    .policy(*policy)?
                    .ok_or(StorageError::PolicyNotFound(*policy))?;
                let cascade_relevant = match previous {
                    None => true,
                    Some(prev) => {
                        prev.active != current.active || prev.enforced != current.enforced
                    }
                };
                if !cascade_relevant {
                    debug!(policy = %current.id, "policy save implies no cascade work");
                    return Ok(Vec::new());
                }
                let mut agents: Vec<AgentId> =
                    related_agents(self.directory.as_ref(), &current)?.into_iter().collect();
                agents.sort();
                Ok(agents)
            }
            PolicyEvent::Deleted { prior_scope } => {
                let mut agents = prior_scope.clone();
                agents.sort();
                agents.dedup();
                Ok(agents)
            }
        }
    }

    /// React to a policy event end-to-end: compute the affected agents and
    /// refresh each of them.
    pub fn handle_event(&self, event: &PolicyEvent) -> Result<RefreshReport, CascadeError> {
        let agents = self.affected_agents(event)?;
        info!(count = agents.len(), "policy event fan-out");
        Ok(self.refresh_agents(agents))
    }
}
