//! Store ports
//!
//! Trait interfaces the engine resolves and reconciles through. Persistence
//! and querying of domain objects live behind these ports; the crate ships an
//! in-memory backend for tests and embedding.

pub mod memory;

use crate::domain::{Agent, Check, Client, MonitoringType, Policy, Site, SyncStatus, Task};
use crate::error::StorageError;
use crate::types::{AgentId, CheckId, ClientId, PolicyId, SiteId, TaskId};

pub use memory::MemoryStore;

/// Lookup of agents, sites, clients, policies, and the global default policy
/// assignments. All reads; the engine never mutates these records.
pub trait Directory: Send + Sync {
    fn agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError>;
    fn site(&self, id: SiteId) -> Result<Option<Site>, StorageError>;
    fn client(&self, id: ClientId) -> Result<Option<Client>, StorageError>;
    fn policy(&self, id: PolicyId) -> Result<Option<Policy>, StorageError>;

    fn agents(&self) -> Result<Vec<Agent>, StorageError>;
    fn sites(&self) -> Result<Vec<Site>, StorageError>;
    fn clients(&self) -> Result<Vec<Client>, StorageError>;

    /// The global default policy for a monitoring class, if one is set.
    fn default_policy(&self, monitoring_type: MonitoringType)
        -> Result<Option<PolicyId>, StorageError>;
}

/// Check persistence port: reads plus the mutations the reconciler commits.
pub trait CheckStore: Send + Sync {
    /// All checks owned by an agent, direct and managed.
    fn agent_checks(&self, agent: AgentId) -> Result<Vec<Check>, StorageError>;
    /// All template checks owned by a policy.
    fn policy_checks(&self, policy: PolicyId) -> Result<Vec<Check>, StorageError>;

    fn mark_check_overridden(&self, check: CheckId) -> Result<(), StorageError>;
    fn set_check_sync_status(&self, check: CheckId, status: SyncStatus)
        -> Result<(), StorageError>;
    fn delete_check(&self, check: CheckId) -> Result<(), StorageError>;

    /// Materialize a template onto an agent, linking `parent_check` back to
    /// the template. Callers guard against duplicate creation by pre-checking
    /// already-materialized parents.
    fn create_policy_check(&self, template: &Check, agent: &Agent)
        -> Result<Check, StorageError>;
}

/// Task persistence port, mirroring [`CheckStore`].
pub trait TaskStore: Send + Sync {
    fn agent_tasks(&self, agent: AgentId) -> Result<Vec<Task>, StorageError>;
    fn policy_tasks(&self, policy: PolicyId) -> Result<Vec<Task>, StorageError>;

    fn set_task_sync_status(&self, task: TaskId, status: SyncStatus)
        -> Result<(), StorageError>;
    fn delete_task(&self, task: TaskId) -> Result<(), StorageError>;

    fn create_policy_task(&self, template: &Task, agent: &Agent) -> Result<Task, StorageError>;
}
