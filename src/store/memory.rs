//! In-memory store backend
//!
//! Implements every port over `parking_lot`-guarded hash maps. Used by the
//! test suite and by embedders that keep their domain state elsewhere and
//! snapshot it into the engine per resolution pass.

use crate::domain::{Agent, Check, Client, MonitoringType, Policy, Site, SyncStatus, Task};
use crate::error::StorageError;
use crate::store::{CheckStore, Directory, TaskStore};
use crate::types::{AgentId, CheckId, ClientId, PolicyId, SiteId, TaskId};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// HashMap-backed implementation of [`Directory`], [`CheckStore`], and
/// [`TaskStore`].
#[derive(Default)]
pub struct MemoryStore {
    agents: RwLock<HashMap<AgentId, Agent>>,
    sites: RwLock<HashMap<SiteId, Site>>,
    clients: RwLock<HashMap<ClientId, Client>>,
    policies: RwLock<HashMap<PolicyId, Policy>>,
    checks: RwLock<HashMap<CheckId, Check>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
    defaults: RwLock<HashMap<MonitoringType, PolicyId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_agent(&self, agent: Agent) {
        self.agents.write().insert(agent.id, agent);
    }

    pub fn insert_site(&self, site: Site) {
        self.sites.write().insert(site.id, site);
    }

    pub fn insert_client(&self, client: Client) {
        self.clients.write().insert(client.id, client);
    }

    pub fn insert_policy(&self, policy: Policy) {
        self.policies.write().insert(policy.id, policy);
    }

    pub fn insert_check(&self, check: Check) {
        self.checks.write().insert(check.id, check);
    }

    pub fn insert_task(&self, task: Task) {
        self.tasks.write().insert(task.id, task);
    }

    pub fn set_default_policy(&self, monitoring_type: MonitoringType, policy: PolicyId) {
        self.defaults.write().insert(monitoring_type, policy);
    }

    pub fn remove_policy(&self, policy: PolicyId) {
        self.policies.write().remove(&policy);
        self.checks.write().retain(|_, c| c.policy != Some(policy) || c.agent.is_some());
        self.tasks.write().retain(|_, t| t.policy != Some(policy) || t.agent.is_some());
    }

    pub fn get_check(&self, id: CheckId) -> Option<Check> {
        self.checks.read().get(&id).cloned()
    }

    pub fn get_task(&self, id: TaskId) -> Option<Task> {
        self.tasks.read().get(&id).cloned()
    }
}

impl Directory for MemoryStore {
    fn agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError> {
        Ok(self.agents.read().get(&id).cloned())
    }

    fn site(&self, id: SiteId) -> Result<Option<Site>, StorageError> {
        Ok(self.sites.read().get(&id).cloned())
    }

    fn client(&self, id: ClientId) -> Result<Option<Client>, StorageError> {
        Ok(self.clients.read().get(&id).cloned())
    }

    fn policy(&self, id: PolicyId) -> Result<Option<Policy>, StorageError> {
        Ok(self.policies.read().get(&id).cloned())
    }

    fn agents(&self) -> Result<Vec<Agent>, StorageError> {
        Ok(self.agents.read().values().cloned().collect())
    }

    fn sites(&self) -> Result<Vec<Site>, StorageError> {
        Ok(self.sites.read().values().cloned().collect())
    }

    fn clients(&self) -> Result<Vec<Client>, StorageError> {
        Ok(self.clients.read().values().cloned().collect())
    }

    fn default_policy(
        &self,
        monitoring_type: MonitoringType,
    ) -> Result<Option<PolicyId>, StorageError> {
        Ok(self.defaults.read().get(&monitoring_type).copied())
    }
}

impl CheckStore for MemoryStore {
    fn agent_checks(&self, agent: AgentId) -> Result<Vec<Check>, StorageError> {
        Ok(self
            .checks
            .read()
            .values()
            .filter(|c| c.agent == Some(agent))
            .cloned()
            .collect())
    }

    fn policy_checks(&self, policy: PolicyId) -> Result<Vec<Check>, StorageError> {
        Ok(self
            .checks
            .read()
            .values()
            .filter(|c| c.policy == Some(policy) && c.is_template())
            .cloned()
            .collect())
    }

    fn mark_check_overridden(&self, check: CheckId) -> Result<(), StorageError> {
        match self.checks.write().get_mut(&check) {
            Some(c) => {
                c.overridden_by_policy = true;
                Ok(())
            }
            None => Err(StorageError::Backend(format!("unknown check: {check}"))),
        }
    }

    fn set_check_sync_status(
        &self,
        check: CheckId,
        status: SyncStatus,
    ) -> Result<(), StorageError> {
        match self.checks.write().get_mut(&check) {
            Some(c) => {
                c.sync_status = status;
                Ok(())
            }
            None => Err(StorageError::Backend(format!("unknown check: {check}"))),
        }
    }

    fn delete_check(&self, check: CheckId) -> Result<(), StorageError> {
        self.checks.write().remove(&check);
        Ok(())
    }

    fn create_policy_check(
        &self,
        template: &Check,
        agent: &Agent,
    ) -> Result<Check, StorageError> {
        let check = Check {
            id: CheckId::new(),
            policy: template.policy,
            agent: Some(agent.id),
            managed_by_policy: true,
            overridden_by_policy: false,
            parent_check: Some(template.id),
            sync_status: SyncStatus::Initial,
            data: template.data.clone(),
            created_at: Utc::now(),
        };
        self.checks.write().insert(check.id, check.clone());
        Ok(check)
    }
}

impl TaskStore for MemoryStore {
    fn agent_tasks(&self, agent: AgentId) -> Result<Vec<Task>, StorageError> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.agent == Some(agent))
            .cloned()
            .collect())
    }

    fn policy_tasks(&self, policy: PolicyId) -> Result<Vec<Task>, StorageError> {
        Ok(self
            .tasks
            .read()
            .values()
            .filter(|t| t.policy == Some(policy) && t.is_template())
            .cloned()
            .collect())
    }

    fn set_task_sync_status(&self, task: TaskId, status: SyncStatus) -> Result<(), StorageError> {
        match self.tasks.write().get_mut(&task) {
            Some(t) => {
                t.sync_status = status;
                Ok(())
            }
            None => Err(StorageError::Backend(format!("unknown task: {task}"))),
        }
    }

    fn delete_task(&self, task: TaskId) -> Result<(), StorageError> {
        self.tasks.write().remove(&task);
        Ok(())
    }

    fn create_policy_task(&self, template: &Task, agent: &Agent) -> Result<Task, StorageError> {
        let task = Task {
            id: TaskId::new(),
            name: template.name.clone(),
            policy: template.policy,
            agent: Some(agent.id),
            managed_by_policy: true,
            parent_task: Some(template.id),
            sync_status: SyncStatus::Initial,
            script: template.script,
            created_at: Utc::now(),
        };
        self.tasks.write().insert(task.id, task.clone());
        Ok(task)
    }
}
