//! Sites and clients: the organizational hierarchy policies cascade through.

use crate::domain::agent::MonitoringType;
use crate::types::{ClientId, PolicyId, SiteId};
use serde::{Deserialize, Serialize};

/// A site groups agents and belongs to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub client: ClientId,
    /// Blocks client-level and default policy application to agents under
    /// this site. The site's own assigned policy still applies.
    pub block_policy_inheritance: bool,
    pub server_policy: Option<PolicyId>,
    pub workstation_policy: Option<PolicyId>,
}

impl Site {
    pub fn new(name: impl Into<String>, client: ClientId) -> Self {
        Self {
            id: SiteId::new(),
            name: name.into(),
            client,
            block_policy_inheritance: false,
            server_policy: None,
            workstation_policy: None,
        }
    }

    /// The policy assigned to this site for the given monitoring class.
    pub fn policy_for(&self, monitoring_type: MonitoringType) -> Option<PolicyId> {
        match monitoring_type {
            MonitoringType::Server => self.server_policy,
            MonitoringType::Workstation => self.workstation_policy,
        }
    }
}

/// A client owns sites and may carry per-class policy assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub server_policy: Option<PolicyId>,
    pub workstation_policy: Option<PolicyId>,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ClientId::new(),
            name: name.into(),
            server_policy: None,
            workstation_policy: None,
        }
    }

    /// The policy assigned to this client for the given monitoring class.
    pub fn policy_for(&self, monitoring_type: MonitoringType) -> Option<PolicyId> {
        match monitoring_type {
            MonitoringType::Server => self.server_policy,
            MonitoringType::Workstation => self.workstation_policy,
        }
    }
}
