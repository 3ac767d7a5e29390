//! Cascade resolution
//!
//! Merges the agent's own items with the items contributed by each applicable
//! policy into one deduplicated, precedence-ordered list. Resolution is pure:
//! it produces a plan of intended mutations (creations, override flags,
//! retirements, revivals) that the reconciler commits in a separate step.

pub mod checks;
pub mod dedup;
pub mod precedence;
pub mod tasks;

pub use checks::{resolve_checks, CheckLayer, CheckPlan};
pub use dedup::DedupKey;
pub use precedence::Precedence;
pub use tasks::{resolve_tasks, TaskPlan};

/// How a stale managed item leaves the materialized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetireAction {
    /// Never pushed to the agent; safe to remove outright.
    Delete,
    /// Already known to the agent; transition to pending-deletion so the
    /// agent can acknowledge removal.
    MarkPendingDeletion,
}

/// A managed item whose parent template fell out of the resolved set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retirement<Id> {
    pub id: Id,
    pub action: RetireAction,
}

pub(crate) fn retire_action(sync_status: crate::domain::SyncStatus) -> RetireAction {
    match sync_status {
        crate::domain::SyncStatus::Initial => RetireAction::Delete,
        _ => RetireAction::MarkPendingDeletion,
    }
}
