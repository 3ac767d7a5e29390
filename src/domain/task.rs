//! Scheduled tasks: policy-owned templates and per-agent materialized copies.

use crate::domain::check::SyncStatus;
use crate::domain::script::ScriptRef;
use crate::types::{AgentId, PolicyId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled task. Every task runs a script; platform compatibility of the
/// script's shell gates whether the task applies to a given agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Owning policy for templates; provenance for materialized copies.
    pub policy: Option<PolicyId>,
    pub agent: Option<AgentId>,
    pub managed_by_policy: bool,
    /// Template this task was materialized from.
    pub parent_task: Option<TaskId>,
    pub sync_status: SyncStatus,
    pub script: ScriptRef,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// A policy-owned template, not yet materialized on any agent.
    pub fn template(policy: PolicyId, name: impl Into<String>, script: ScriptRef) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            policy: Some(policy),
            agent: None,
            managed_by_policy: false,
            parent_task: None,
            sync_status: SyncStatus::Initial,
            script,
            created_at: Utc::now(),
        }
    }

    /// A task created directly on an agent by a user.
    pub fn direct(agent: AgentId, name: impl Into<String>, script: ScriptRef) -> Self {
        Self {
            id: TaskId::new(),
            name: name.into(),
            policy: None,
            agent: Some(agent),
            managed_by_policy: false,
            parent_task: None,
            sync_status: SyncStatus::Initial,
            script,
            created_at: Utc::now(),
        }
    }

    pub fn is_template(&self) -> bool {
        self.agent.is_none()
    }
}
