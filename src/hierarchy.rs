//! Policy Hierarchy Locator
//!
//! Given an agent, finds the up-to-four applicable policies: agent-level,
//! site-level, client-level, and the global default for the agent's
//! monitoring class. Any level may be absent; absence is never an error.

use crate::domain::{Agent, Policy};
use crate::error::StorageError;
use crate::store::Directory;
use crate::types::PolicyId;
use std::sync::Arc;

/// The applicable policies for one agent, in precedence order:
/// agent, site, client, default.
#[derive(Debug, Clone, Default)]
pub struct PolicyStack {
    pub agent_policy: Option<Policy>,
    pub site_policy: Option<Policy>,
    pub client_policy: Option<Policy>,
    pub default_policy: Option<Policy>,
}

impl PolicyStack {
    /// Present levels in precedence order.
    pub fn layers(&self) -> impl Iterator<Item = &Policy> {
        self.agent_policy
            .iter()
            .chain(self.site_policy.iter())
            .chain(self.client_policy.iter())
            .chain(self.default_policy.iter())
    }

    /// Present levels that are active and therefore contribute to the cascade.
    pub fn active_layers(&self) -> impl Iterator<Item = &Policy> {
        self.layers().filter(|policy| policy.active)
    }
}

/// Locator port. The directory-backed implementation below is the default;
/// embedders with their own policy lookup can substitute their own.
pub trait PolicyLocator: Send + Sync {
    fn locate(&self, agent: &Agent) -> Result<PolicyStack, StorageError>;
}

/// Locates the hierarchy from the directory port, honoring exclusion sets
/// and inheritance-blocking flags:
/// - the agent policy applies unless the policy excludes the agent;
/// - site, client, and default policies are inherited and are dropped when
///   the agent blocks inheritance;
/// - client and default policies are additionally dropped when the agent's
///   site blocks inheritance.
pub struct DirectoryPolicyLocator {
    directory: Arc<dyn Directory>,
}

impl DirectoryPolicyLocator {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    fn fetch(&self, id: Option<PolicyId>) -> Result<Option<Policy>, StorageError> {
        match id {
            Some(id) => {
                let policy = self
                    .directory
                    .policy(id)?
                    .ok_or(StorageError::PolicyNotFound(id))?;
                Ok(Some(policy))
            }
            None => Ok(None),
        }
    }
}

impl PolicyLocator for DirectoryPolicyLocator {
    fn locate(&self, agent: &Agent) -> Result<PolicyStack, StorageError> {
        let site = self
            .directory
            .site(agent.site)?
            .ok_or(StorageError::SiteNotFound(agent.site))?;
        let client = self
            .directory
            .client(site.client)?
            .ok_or(StorageError::ClientNotFound(site.client))?;

        let not_excluded =
            |policy: Policy| -> Option<Policy> { (!policy.excludes_agent(agent, &site)).then_some(policy) };

        let agent_policy = self.fetch(agent.policy)?.and_then(not_excluded);

        let inherits = !agent.block_policy_inheritance;
        let inherits_client = inherits && !site.block_policy_inheritance;

        let site_policy = if inherits {
            self.fetch(site.policy_for(agent.monitoring_type))?
                .and_then(not_excluded)
        } else {
            None
        };

        let client_policy = if inherits_client {
            self.fetch(client.policy_for(agent.monitoring_type))?
                .and_then(not_excluded)
        } else {
            None
        };

        let default_policy = if inherits_client {
            self.fetch(self.directory.default_policy(agent.monitoring_type)?)?
                .and_then(not_excluded)
        } else {
            None
        };

        Ok(PolicyStack {
            agent_policy,
            site_policy,
            client_policy,
            default_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Client, MonitoringType, Platform, Site};
    use crate::store::MemoryStore;

    fn locator_fixture() -> (Arc<MemoryStore>, Client, Site, Agent) {
        let store = Arc::new(MemoryStore::new());
        let client = Client::new("acme");
        let site = Site::new("hq", client.id);
        let agent = Agent::new("host", MonitoringType::Server, Platform::Windows, site.id);
        store.insert_client(client.clone());
        store.insert_site(site.clone());
        store.insert_agent(agent.clone());
        (store, client, site, agent)
    }

    #[test]
    fn test_empty_stack_when_nothing_assigned() {
        let (store, _, _, agent) = locator_fixture();
        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        assert_eq!(stack.layers().count(), 0);
    }

    #[test]
    fn test_all_four_levels_in_order() {
        let (store, mut client, mut site, mut agent) = locator_fixture();
        let agent_policy = Policy::new("agent").active();
        let site_policy = Policy::new("site").active();
        let client_policy = Policy::new("client").active();
        let default_policy = Policy::new("default").active();
        for policy in [&agent_policy, &site_policy, &client_policy, &default_policy] {
            store.insert_policy(policy.clone());
        }
        agent.policy = Some(agent_policy.id);
        site.server_policy = Some(site_policy.id);
        client.server_policy = Some(client_policy.id);
        store.insert_agent(agent.clone());
        store.insert_site(site);
        store.insert_client(client);
        store.set_default_policy(MonitoringType::Server, default_policy.id);

        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        let names: Vec<&str> = stack.layers().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["agent", "site", "client", "default"]);
    }

    #[test]
    fn test_agent_blocking_keeps_only_agent_policy() {
        let (store, mut client, mut site, mut agent) = locator_fixture();
        let agent_policy = Policy::new("agent").active();
        let site_policy = Policy::new("site").active();
        let default_policy = Policy::new("default").active();
        for policy in [&agent_policy, &site_policy, &default_policy] {
            store.insert_policy(policy.clone());
        }
        agent.policy = Some(agent_policy.id);
        agent.block_policy_inheritance = true;
        site.server_policy = Some(site_policy.id);
        client.server_policy = Some(site_policy.id);
        store.insert_agent(agent.clone());
        store.insert_site(site);
        store.insert_client(client);
        store.set_default_policy(MonitoringType::Server, default_policy.id);

        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        assert!(stack.agent_policy.is_some());
        assert!(stack.site_policy.is_none());
        assert!(stack.client_policy.is_none());
        assert!(stack.default_policy.is_none());
    }

    #[test]
    fn test_site_blocking_keeps_site_policy_drops_client_and_default() {
        let (store, mut client, mut site, agent) = locator_fixture();
        let site_policy = Policy::new("site").active();
        let client_policy = Policy::new("client").active();
        store.insert_policy(site_policy.clone());
        store.insert_policy(client_policy.clone());
        site.server_policy = Some(site_policy.id);
        site.block_policy_inheritance = true;
        client.server_policy = Some(client_policy.id);
        store.insert_site(site);
        store.insert_client(client);

        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        assert!(stack.site_policy.is_some());
        assert!(stack.client_policy.is_none());
        assert!(stack.default_policy.is_none());
    }

    #[test]
    fn test_excluded_agent_drops_every_level() {
        let (store, mut client, mut site, mut agent) = locator_fixture();
        let mut policy = Policy::new("everywhere").active();
        policy.excluded_agents.insert(agent.id);
        store.insert_policy(policy.clone());
        agent.policy = Some(policy.id);
        site.server_policy = Some(policy.id);
        client.server_policy = Some(policy.id);
        store.insert_agent(agent.clone());
        store.insert_site(site);
        store.insert_client(client);
        store.set_default_policy(MonitoringType::Server, policy.id);

        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        assert_eq!(stack.layers().count(), 0);
    }

    #[test]
    fn test_dangling_policy_reference_is_lookup_failure() {
        let (store, _, _, mut agent) = locator_fixture();
        agent.policy = Some(PolicyId::new());
        store.insert_agent(agent.clone());

        let locator = DirectoryPolicyLocator::new(store);
        assert!(matches!(
            locator.locate(&agent),
            Err(StorageError::PolicyNotFound(_))
        ));
    }

    #[test]
    fn test_inactive_policy_located_but_not_active_layer() {
        let (store, _, mut site, agent) = locator_fixture();
        let policy = Policy::new("inactive");
        store.insert_policy(policy.clone());
        site.server_policy = Some(policy.id);
        store.insert_site(site);

        let locator = DirectoryPolicyLocator::new(store);
        let stack = locator.locate(&agent).unwrap();
        assert_eq!(stack.layers().count(), 1);
        assert_eq!(stack.active_layers().count(), 0);
    }
}
