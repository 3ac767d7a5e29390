//! Scope Resolver
//!
//! Computes the set of agents a policy currently applies to, honoring
//! exclusion sets and inheritance-blocking flags. Pure reads over the
//! directory port; safe to run concurrently across policies.

use crate::domain::{MonitoringType, Policy, Site};
use crate::error::StorageError;
use crate::store::Directory;
use crate::types::{AgentId, ClientId, SiteId};
use std::collections::{HashMap, HashSet};

/// Resolve the set of agents `policy` applies to for one monitoring class.
///
/// An agent is in scope when it is explicitly assigned the policy, when its
/// site is assigned the policy (and the site's client does not claim the
/// agent through the client path), or when its site's client is assigned the
/// policy and neither the agent nor the site blocks inheritance. An agent
/// excluded directly, through its site, or through its client is never in
/// scope, regardless of assignment.
pub fn resolve_scope(
    directory: &dyn Directory,
    policy: &Policy,
    monitoring_type: MonitoringType,
) -> Result<HashSet<AgentId>, StorageError> {
    let agents = directory.agents()?;
    let sites: HashMap<SiteId, Site> = directory
        .sites()?
        .into_iter()
        .map(|site| (site.id, site))
        .collect();

    let explicit_sites: HashSet<SiteId> = sites
        .values()
        .filter(|site| {
            site.policy_for(monitoring_type) == Some(policy.id)
                && !policy.excluded_sites.contains(&site.id)
        })
        .map(|site| site.id)
        .collect();

    let explicit_clients: HashSet<ClientId> = directory
        .clients()?
        .into_iter()
        .filter(|client| {
            client.policy_for(monitoring_type) == Some(policy.id)
                && !policy.excluded_clients.contains(&client.id)
        })
        .map(|client| client.id)
        .collect();

    let mut scope = HashSet::new();
    for agent in &agents {
        if agent.monitoring_type != monitoring_type {
            continue;
        }
        let site = sites
            .get(&agent.site)
            .ok_or(StorageError::SiteNotFound(agent.site))?;

        // Exclusion always wins, even over explicit assignment.
        if policy.excludes_agent(agent, site) {
            continue;
        }

        if agent.policy == Some(policy.id) {
            scope.insert(agent.id);
            continue;
        }

        if agent.block_policy_inheritance {
            continue;
        }

        // Inherited via site. Sites whose client already inherits the policy
        // through the client path are claimed there instead.
        if explicit_sites.contains(&agent.site) && !explicit_clients.contains(&site.client) {
            scope.insert(agent.id);
            continue;
        }

        // Inherited via client; the site must not block inheritance.
        if !site.block_policy_inheritance && explicit_clients.contains(&site.client) {
            scope.insert(agent.id);
        }
    }

    Ok(scope)
}

/// Agents in scope for either monitoring class. Used to capture the blast
/// radius of a policy save or delete.
pub fn related_agents(
    directory: &dyn Directory,
    policy: &Policy,
) -> Result<HashSet<AgentId>, StorageError> {
    let mut scope = resolve_scope(directory, policy, MonitoringType::Server)?;
    scope.extend(resolve_scope(directory, policy, MonitoringType::Workstation)?);
    Ok(scope)
}
