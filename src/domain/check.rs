//! Monitoring checks: policy-owned templates and per-agent materialized copies.

use crate::domain::script::ScriptRef;
use crate::types::{AgentId, CheckId, PolicyId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synchronization state of a materialized item with the remote agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Created locally, never pushed to the agent.
    Initial,
    /// Local changes not yet acknowledged by the agent.
    NotSynced,
    /// In sync with the agent.
    Synced,
    /// Scheduled for removal, awaiting agent acknowledgement.
    PendingDeletion,
}

/// Check class. The declaration order is the fixed order resolved checks are
/// emitted in, so it must stay: diskspace, ping, cpuload, memory, winsvc,
/// script, eventlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckType {
    DiskSpace,
    Ping,
    CpuLoad,
    Memory,
    WinSvc,
    Script,
    EventLog,
}

/// Type-specific payload of a check. The payload carries the identity field
/// used for deduplication; cpuload and memory have none (at most one per
/// agent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CheckData {
    DiskSpace { disk: String },
    Ping { host: String },
    CpuLoad,
    Memory,
    WinSvc { service_name: String },
    Script { script: ScriptRef },
    EventLog { log_name: String, event_id: u32 },
}

impl CheckData {
    pub fn check_type(&self) -> CheckType {
        match self {
            CheckData::DiskSpace { .. } => CheckType::DiskSpace,
            CheckData::Ping { .. } => CheckType::Ping,
            CheckData::CpuLoad => CheckType::CpuLoad,
            CheckData::Memory => CheckType::Memory,
            CheckData::WinSvc { .. } => CheckType::WinSvc,
            CheckData::Script { .. } => CheckType::Script,
            CheckData::EventLog { .. } => CheckType::EventLog,
        }
    }
}

/// A monitoring check. A template is owned by a policy (`agent` is `None`);
/// a materialized or user-created check is owned by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Check {
    pub id: CheckId,
    /// Owning policy for templates; provenance for materialized copies.
    pub policy: Option<PolicyId>,
    pub agent: Option<AgentId>,
    pub managed_by_policy: bool,
    /// Set on a direct check when a policy item of the same identity took
    /// precedence. The check stays visible for inspection.
    pub overridden_by_policy: bool,
    /// Template this check was materialized from.
    pub parent_check: Option<CheckId>,
    pub sync_status: SyncStatus,
    pub data: CheckData,
    pub created_at: DateTime<Utc>,
}

impl Check {
    /// A policy-owned template, not yet materialized on any agent.
    pub fn template(policy: PolicyId, data: CheckData) -> Self {
        Self {
            id: CheckId::new(),
            policy: Some(policy),
            agent: None,
            managed_by_policy: false,
            overridden_by_policy: false,
            parent_check: None,
            sync_status: SyncStatus::Initial,
            data,
            created_at: Utc::now(),
        }
    }

    /// A check created directly on an agent by a user.
    pub fn direct(agent: AgentId, data: CheckData) -> Self {
        Self {
            id: CheckId::new(),
            policy: None,
            agent: Some(agent),
            managed_by_policy: false,
            overridden_by_policy: false,
            parent_check: None,
            sync_status: SyncStatus::Initial,
            data,
            created_at: Utc::now(),
        }
    }

    pub fn is_template(&self) -> bool {
        self.agent.is_none()
    }
}
