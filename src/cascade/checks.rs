//! Check Cascade Resolver
//!
//! Merges the agent's direct checks with the checks contributed by each
//! active policy in the hierarchy into one deduplicated, precedence-ordered
//! list, and computes the reconciliation delta against the agent's currently
//! materialized managed checks.

use crate::cascade::dedup::{admits, dedup_key, DedupKey};
use crate::cascade::precedence::Precedence;
use crate::cascade::{retire_action, Retirement};
use crate::domain::{Agent, Check, CheckType, SyncStatus};
use crate::script::ScriptGate;
use crate::types::{AgentId, CheckId};
use std::collections::{BTreeMap, HashSet};

/// One active policy's contribution to the cascade, in stack order.
#[derive(Debug, Clone)]
pub struct CheckLayer {
    pub enforced: bool,
    pub checks: Vec<Check>,
}

/// Intended mutations produced by check resolution. Nothing is persisted
/// until the reconciler applies the plan.
#[derive(Debug, Clone, Default)]
pub struct CheckPlan {
    pub agent: AgentId,
    /// Accepted templates in the fixed emission order.
    pub resolved: Vec<Check>,
    /// Accepted templates not yet materialized on the agent.
    pub creations: Vec<Check>,
    /// Direct checks beaten by a policy item of the same identity.
    pub overridden: Vec<CheckId>,
    /// Managed checks whose parent template fell out of the resolved set.
    pub retirements: Vec<Retirement<CheckId>>,
    /// Pending-deletion checks whose parent template reappeared.
    pub revivals: Vec<CheckId>,
}

impl CheckPlan {
    /// True when applying the plan would change nothing.
    pub fn is_noop(&self) -> bool {
        self.creations.is_empty()
            && self.overridden.is_empty()
            && self.retirements.is_empty()
            && self.revivals.is_empty()
    }
}

/// Resolve the effective check set for one agent.
///
/// `layers` must contain only active policies, in stack order (agent, site,
/// client, default). Candidates are considered enforced-first, then the
/// agent's direct checks, then non-enforced policy checks; the first claim
/// on a deduplication key wins. A direct check that loses a collision is
/// flagged overridden but kept; a direct check that wins blocks later
/// templates of the same identity without itself being re-materialized.
pub fn resolve_checks(
    agent: &Agent,
    agent_checks: &[Check],
    layers: &[CheckLayer],
    gate: &dyn ScriptGate,
) -> CheckPlan {
    let direct: Vec<&Check> = agent_checks
        .iter()
        .filter(|check| !check.managed_by_policy)
        .collect();

    let prior_parents: HashSet<CheckId> = agent_checks
        .iter()
        .filter(|check| check.managed_by_policy)
        .filter_map(|check| check.parent_check)
        .collect();

    let mut enforced: Vec<&Check> = Vec::new();
    let mut inherited: Vec<&Check> = Vec::new();
    for layer in layers {
        let bucket = if layer.enforced {
            &mut enforced
        } else {
            &mut inherited
        };
        bucket.extend(layer.checks.iter());
    }

    let sequence = enforced
        .into_iter()
        .map(|check| (Precedence::Enforced, check))
        .chain(direct.into_iter().map(|check| (Precedence::Direct, check)))
        .chain(inherited.into_iter().map(|check| (Precedence::Inherited, check)));

    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut buckets: BTreeMap<CheckType, Vec<Check>> = BTreeMap::new();
    let mut overridden = Vec::new();

    for (precedence, check) in sequence {
        if !admits(check, agent.platform, gate) {
            continue;
        }
        if seen.insert(dedup_key(&check.data)) {
            // First claim wins. Only templates are materialized; a winning
            // direct check claims the key and nothing else.
            if check.is_template() {
                buckets
                    .entry(check.data.check_type())
                    .or_default()
                    .push(check.clone());
            }
        } else if precedence == Precedence::Direct && !check.overridden_by_policy {
            overridden.push(check.id);
        }
    }

    let resolved: Vec<Check> = buckets.into_values().flatten().collect();
    let accepted: HashSet<CheckId> = resolved.iter().map(|check| check.id).collect();

    let mut retirements = Vec::new();
    let mut revivals = Vec::new();
    for check in agent_checks.iter().filter(|check| check.managed_by_policy) {
        let parent_accepted = check
            .parent_check
            .is_some_and(|parent| accepted.contains(&parent));
        if parent_accepted {
            if check.sync_status == SyncStatus::PendingDeletion {
                revivals.push(check.id);
            }
        } else if check.sync_status != SyncStatus::PendingDeletion {
            retirements.push(Retirement {
                id: check.id,
                action: retire_action(check.sync_status),
            });
        }
    }

    let creations: Vec<Check> = resolved
        .iter()
        .filter(|check| !prior_parents.contains(&check.id))
        .cloned()
        .collect();

    CheckPlan {
        agent: agent.id,
        resolved,
        creations,
        overridden,
        retirements,
        revivals,
    }
}
