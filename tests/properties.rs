//! End-to-end behavioral coverage of the resolution engine against the
//! in-memory backend: idempotence, exclusion precedence, inheritance
//! blocking, enforced precedence, dedup, platform filtering, retirement,
//! and revival.

use std::sync::Arc;

use cascade::domain::{
    Agent, Check, CheckData, Client, MonitoringType, Platform, Policy, ScriptRef, ScriptShell,
    Site, SyncStatus, Task,
};
use cascade::engine::{Engine, PolicyEvent};
use cascade::scope::resolve_scope;
use cascade::store::{CheckStore, MemoryStore, TaskStore};
use proptest::prelude::*;

struct World {
    store: Arc<MemoryStore>,
    engine: Engine,
    client: Client,
    site: Site,
}

impl World {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let client = Client::new("acme");
        let site = Site::new("hq", client.id);
        store.insert_client(client.clone());
        store.insert_site(site.clone());
        let engine = Engine::new(store.clone(), store.clone(), store.clone());
        World {
            store,
            engine,
            client,
            site,
        }
    }

    fn windows_server(&self) -> Agent {
        let agent = Agent::new(
            "srv-1",
            MonitoringType::Server,
            Platform::Windows,
            self.site.id,
        );
        self.store.insert_agent(agent.clone());
        agent
    }

    fn managed_checks(&self, agent: &Agent) -> Vec<Check> {
        CheckStore::agent_checks(self.store.as_ref(), agent.id)
            .unwrap()
            .into_iter()
            .filter(|c| c.managed_by_policy)
            .collect()
    }

    fn managed_tasks(&self, agent: &Agent) -> Vec<Task> {
        TaskStore::agent_tasks(self.store.as_ref(), agent.id)
            .unwrap()
            .into_iter()
            .filter(|t| t.managed_by_policy)
            .collect()
    }
}

fn disk(letter: &str) -> CheckData {
    CheckData::DiskSpace {
        disk: letter.to_string(),
    }
}

fn ping(host: &str) -> CheckData {
    CheckData::Ping {
        host: host.to_string(),
    }
}

#[test]
fn resolution_is_idempotent() {
    let world = World::new();
    let mut agent = world.windows_server();
    let policy = Policy::new("baseline").active();
    world.store.insert_policy(policy.clone());
    agent.policy = Some(policy.id);
    world.store.insert_agent(agent.clone());

    world
        .store
        .insert_check(Check::template(policy.id, ping("10.0.0.1")));
    world.store.insert_task(Task::template(
        policy.id,
        "inventory",
        ScriptRef::new(ScriptShell::Python),
    ));

    let first = world.engine.refresh_agent(agent.id).unwrap();
    assert_eq!(first.checks.created, 1);
    assert_eq!(first.tasks.created, 1);

    let before_checks = world.managed_checks(&agent);
    let before_tasks = world.managed_tasks(&agent);

    let second = world.engine.refresh_agent(agent.id).unwrap();
    assert_eq!(second.checks.created, 0);
    assert_eq!(second.tasks.created, 0);
    assert_eq!(second.checks.retired + second.checks.revived, 0);
    assert_eq!(second.tasks.retired + second.tasks.revived, 0);

    let after_checks = world.managed_checks(&agent);
    let after_tasks = world.managed_tasks(&agent);
    assert_eq!(before_checks.len(), after_checks.len());
    assert_eq!(before_tasks.len(), after_tasks.len());
}

#[test]
fn inheritance_blocking_leaves_only_the_agent_policy() {
    let world = World::new();
    let mut agent = world.windows_server();
    agent.block_policy_inheritance = true;

    let agent_policy = Policy::new("mine").active();
    let site_policy = Policy::new("site").active();
    let default_policy = Policy::new("default").active();
    for p in [&agent_policy, &site_policy, &default_policy] {
        world.store.insert_policy(p.clone());
    }
    agent.policy = Some(agent_policy.id);
    world.store.insert_agent(agent.clone());

    let mut site = world.site.clone();
    site.server_policy = Some(site_policy.id);
    world.store.insert_site(site);
    world
        .store
        .set_default_policy(MonitoringType::Server, default_policy.id);

    world
        .store
        .insert_check(Check::template(agent_policy.id, ping("from-agent")));
    world
        .store
        .insert_check(Check::template(site_policy.id, ping("from-site")));
    world
        .store
        .insert_check(Check::template(default_policy.id, ping("from-default")));

    world.engine.refresh_agent(agent.id).unwrap();
    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].data, ping("from-agent"));
}

#[test]
fn enforced_ping_wins_over_direct_and_plain_policy() {
    let world = World::new();
    let mut agent = world.windows_server();

    let enforced = Policy::new("enforced").active().enforced();
    let plain = Policy::new("plain").active();
    world.store.insert_policy(enforced.clone());
    world.store.insert_policy(plain.clone());
    agent.policy = Some(enforced.id);
    world.store.insert_agent(agent.clone());
    let mut site = world.site.clone();
    site.server_policy = Some(plain.id);
    world.store.insert_site(site);

    let enforced_ping = Check::template(enforced.id, ping("10.0.0.1"));
    world.store.insert_check(enforced_ping.clone());
    world
        .store
        .insert_check(Check::template(plain.id, ping("10.0.0.1")));
    let direct = Check::direct(agent.id, ping("10.0.0.1"));
    world.store.insert_check(direct.clone());

    world.engine.refresh_agent(agent.id).unwrap();

    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].parent_check, Some(enforced_ping.id));
    assert!(
        world
            .store
            .get_check(direct.id)
            .unwrap()
            .overridden_by_policy
    );
}

#[test]
fn two_policies_same_disk_materialize_once() {
    let world = World::new();
    let agent = world.windows_server();

    let site_policy = Policy::new("site").active();
    let client_policy = Policy::new("client").active();
    world.store.insert_policy(site_policy.clone());
    world.store.insert_policy(client_policy.clone());
    let mut site = world.site.clone();
    site.server_policy = Some(site_policy.id);
    world.store.insert_site(site);
    let mut client = world.client.clone();
    client.server_policy = Some(client_policy.id);
    world.store.insert_client(client);

    world
        .store
        .insert_check(Check::template(site_policy.id, disk("C:")));
    world
        .store
        .insert_check(Check::template(client_policy.id, disk("C:")));

    world.engine.refresh_agent(agent.id).unwrap();
    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].data, disk("C:"));
}

#[test]
fn windows_templates_and_foreign_shells_never_reach_a_linux_agent() {
    let world = World::new();
    let mut agent = Agent::new(
        "lnx-1",
        MonitoringType::Server,
        Platform::Linux,
        world.site.id,
    );
    let policy = Policy::new("mixed").active();
    world.store.insert_policy(policy.clone());
    agent.policy = Some(policy.id);
    world.store.insert_agent(agent.clone());

    world.store.insert_check(Check::template(policy.id, disk("C:")));
    world
        .store
        .insert_check(Check::template(policy.id, CheckData::CpuLoad));
    world
        .store
        .insert_check(Check::template(policy.id, ping("gw")));
    world.store.insert_task(Task::template(
        policy.id,
        "ps-only",
        ScriptRef::new(ScriptShell::PowerShell),
    ));
    world.store.insert_task(Task::template(
        policy.id,
        "portable",
        ScriptRef::new(ScriptShell::Python),
    ));

    world.engine.refresh_agent(agent.id).unwrap();
    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].data, ping("gw"));
    let tasks = world.managed_tasks(&agent);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "portable");
}

#[test]
fn retirement_splits_on_sync_state_and_revival_preserves_identity() {
    let world = World::new();
    let mut agent = world.windows_server();
    let mut policy = Policy::new("baseline").active();
    world.store.insert_policy(policy.clone());
    agent.policy = Some(policy.id);
    world.store.insert_agent(agent.clone());

    let synced_template = Check::template(policy.id, disk("C:"));
    let unsynced_template = Check::template(policy.id, disk("D:"));
    world.store.insert_check(synced_template.clone());
    world.store.insert_check(unsynced_template.clone());

    world.engine.refresh_agent(agent.id).unwrap();
    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 2);

    // Mark the C: copy as synced with the remote agent; leave D: as Initial.
    let synced_copy = managed
        .iter()
        .find(|c| c.parent_check == Some(synced_template.id))
        .unwrap()
        .clone();
    world
        .store
        .set_check_sync_status(synced_copy.id, SyncStatus::Synced)
        .unwrap();

    policy.active = false;
    world.store.insert_policy(policy.clone());
    world.engine.refresh_agent(agent.id).unwrap();

    // Never-synced copy is gone; synced copy lingers pending deletion.
    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].id, synced_copy.id);
    assert_eq!(managed[0].sync_status, SyncStatus::PendingDeletion);

    // Reactivate: the pending copy revives under the same identity, and only
    // the D: template is materialized anew.
    policy.active = true;
    world.store.insert_policy(policy.clone());
    let refresh = world.engine.refresh_agent(agent.id).unwrap();
    assert_eq!(refresh.checks.revived, 1);
    assert_eq!(refresh.checks.created, 1);

    let revived = world.store.get_check(synced_copy.id).unwrap();
    assert_eq!(revived.sync_status, SyncStatus::NotSynced);
}

#[test]
fn worked_example_enforced_disk_and_team_disk() {
    let world = World::new();
    let mut agent = world.windows_server();

    let enforced_disk = Policy::new("Enforced-Disk").active().enforced();
    let team_disk = Policy::new("Team-Disk").active();
    world.store.insert_policy(enforced_disk.clone());
    world.store.insert_policy(team_disk.clone());
    agent.policy = Some(enforced_disk.id);
    world.store.insert_agent(agent.clone());
    let mut site = world.site.clone();
    site.server_policy = Some(team_disk.id);
    world.store.insert_site(site);

    let enforced_c = Check::template(enforced_disk.id, disk("C:"));
    let team_c = Check::template(team_disk.id, disk("C:"));
    let team_d = Check::template(team_disk.id, disk("D:"));
    world.store.insert_check(enforced_c.clone());
    world.store.insert_check(team_c);
    world.store.insert_check(team_d.clone());
    let direct_c = Check::direct(agent.id, disk("C:"));
    world.store.insert_check(direct_c.clone());

    world.engine.refresh_agent(agent.id).unwrap();

    let managed = world.managed_checks(&agent);
    assert_eq!(managed.len(), 2);
    let parents: Vec<_> = managed.iter().filter_map(|c| c.parent_check).collect();
    assert!(parents.contains(&enforced_c.id));
    assert!(parents.contains(&team_d.id));
    assert!(
        world
            .store
            .get_check(direct_c.id)
            .unwrap()
            .overridden_by_policy
    );
}

#[test]
fn deleting_a_policy_cleans_up_its_captured_scope() {
    let world = World::new();
    let agent = world.windows_server();
    let policy = Policy::new("doomed").active();
    world.store.insert_policy(policy.clone());
    let mut site = world.site.clone();
    site.server_policy = Some(policy.id);
    world.store.insert_site(site.clone());

    world
        .store
        .insert_check(Check::template(policy.id, ping("10.0.0.1")));
    world.engine.refresh_agent(agent.id).unwrap();
    assert_eq!(world.managed_checks(&agent).len(), 1);

    let prior_scope = world.engine.capture_scope(policy.id).unwrap();
    world.store.remove_policy(policy.id);
    site.server_policy = None;
    world.store.insert_site(site);

    let report = world
        .engine
        .handle_event(&PolicyEvent::Deleted { prior_scope })
        .unwrap();
    assert_eq!(report.failures.len(), 0);
    assert!(world.managed_checks(&agent).is_empty());
}

#[test]
fn new_policy_save_fans_out_over_its_scope() {
    let world = World::new();
    let agent = world.windows_server();
    let policy = Policy::new("fresh").active();
    world.store.insert_policy(policy.clone());
    let mut site = world.site.clone();
    site.server_policy = Some(policy.id);
    world.store.insert_site(site);
    world
        .store
        .insert_check(Check::template(policy.id, ping("10.0.0.1")));

    let report = world
        .engine
        .handle_event(&PolicyEvent::Saved {
            policy: policy.id,
            previous: None,
        })
        .unwrap();
    assert_eq!(report.refreshed.len(), 1);
    assert_eq!(report.refreshed[0].agent, agent.id);
    assert_eq!(world.managed_checks(&agent).len(), 1);
}

proptest! {
    /// Exclusion always wins: however the policy reaches the agent
    /// (explicit assignment, site, or client), any exclusion bit removes
    /// the agent from scope.
    #[test]
    fn exclusion_always_beats_assignment(
        assign_agent in any::<bool>(),
        assign_site in any::<bool>(),
        assign_client in any::<bool>(),
        exclude_agent in any::<bool>(),
        exclude_site in any::<bool>(),
        exclude_client in any::<bool>(),
    ) {
        prop_assume!(assign_agent || assign_site || assign_client);

        let store = MemoryStore::new();
        let mut client = Client::new("acme");
        let mut site = Site::new("hq", client.id);
        let mut policy = Policy::new("p").active();
        let mut agent = Agent::new("host", MonitoringType::Server, Platform::Windows, site.id);

        if assign_agent {
            agent.policy = Some(policy.id);
        }
        if assign_site {
            site.server_policy = Some(policy.id);
        }
        if assign_client {
            client.server_policy = Some(policy.id);
        }
        if exclude_agent {
            policy.excluded_agents.insert(agent.id);
        }
        if exclude_site {
            policy.excluded_sites.insert(site.id);
        }
        if exclude_client {
            policy.excluded_clients.insert(client.id);
        }

        store.insert_client(client);
        store.insert_site(site);
        store.insert_policy(policy.clone());
        store.insert_agent(agent.clone());

        let scope = resolve_scope(&store, &policy, MonitoringType::Server).unwrap();
        let excluded = exclude_agent || exclude_site || exclude_client;
        if excluded {
            prop_assert!(!scope.contains(&agent.id));
        } else {
            prop_assert!(scope.contains(&agent.id));
        }
    }
}
