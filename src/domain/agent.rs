//! Managed endpoints.

use crate::types::{AgentId, PolicyId, SiteId};
use serde::{Deserialize, Serialize};

/// Monitoring class of an endpoint. Policy assignment slots on sites,
/// clients, and the global default are keyed by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitoringType {
    Server,
    Workstation,
}

/// Operating system family of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    Mac,
}

impl Platform {
    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }
}

/// A remotely managed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub hostname: String,
    pub monitoring_type: MonitoringType,
    pub platform: Platform,
    /// Blocks site/client/default policy application to this agent.
    /// An explicitly-assigned agent policy still applies.
    pub block_policy_inheritance: bool,
    pub site: SiteId,
    /// Policy explicitly assigned to this agent, if any.
    pub policy: Option<PolicyId>,
}

impl Agent {
    pub fn new(
        hostname: impl Into<String>,
        monitoring_type: MonitoringType,
        platform: Platform,
        site: SiteId,
    ) -> Self {
        Self {
            id: AgentId::new(),
            hostname: hostname.into(),
            monitoring_type,
            platform,
            block_policy_inheritance: false,
            site,
            policy: None,
        }
    }

    pub fn with_policy(mut self, policy: PolicyId) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn block_inheritance(mut self) -> Self {
        self.block_policy_inheritance = true;
        self
    }
}
