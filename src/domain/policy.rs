//! Reusable policy bundles.

use crate::domain::agent::Agent;
use crate::domain::org::Site;
use crate::types::{AgentId, AlertTemplateId, ClientId, PolicyId, SiteId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A reusable bundle of check/task templates, applicable to agents via direct
/// assignment or inheritance through site and client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub description: Option<String>,
    /// Inactive policies contribute nothing to the cascade.
    pub active: bool,
    /// Enforced policies' items win identity collisions against an agent's
    /// own items and against non-enforced policies.
    pub enforced: bool,
    pub alert_template: Option<AlertTemplateId>,
    pub excluded_agents: HashSet<AgentId>,
    pub excluded_sites: HashSet<SiteId>,
    pub excluded_clients: HashSet<ClientId>,
    pub created_at: DateTime<Utc>,
}

impl Policy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PolicyId::new(),
            name: name.into(),
            description: None,
            active: false,
            enforced: false,
            alert_template: None,
            excluded_agents: HashSet::new(),
            excluded_sites: HashSet::new(),
            excluded_clients: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn enforced(mut self) -> Self {
        self.enforced = true;
        self
    }

    /// Whether this policy excludes the agent, either directly or through the
    /// agent's site or the site's client. Exclusion always wins over any form
    /// of assignment or inheritance.
    pub fn excludes_agent(&self, agent: &Agent, site: &Site) -> bool {
        self.excluded_agents.contains(&agent.id)
            || self.excluded_sites.contains(&agent.site)
            || self.excluded_clients.contains(&site.client)
    }
}
