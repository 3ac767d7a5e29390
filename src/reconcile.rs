//! Reconciler
//!
//! Commits the plans produced by cascade resolution: override flags,
//! retirements, and revivals first, then materialization of genuinely-new
//! templates through the creation collaborators. One failed creation is
//! logged and skipped; the template stays unmaterialized and is retried on
//! the next resolution pass.

use crate::cascade::{CheckPlan, RetireAction, TaskPlan};
use crate::domain::{Agent, SyncStatus};
use crate::error::CascadeError;
use crate::store::{CheckStore, TaskStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Counts of mutations committed for one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub created: usize,
    pub retired: usize,
    pub revived: usize,
    pub overridden: usize,
    pub failed_creations: usize,
}

/// Applies resolution plans against the store ports.
pub struct Reconciler {
    checks: Arc<dyn CheckStore>,
    tasks: Arc<dyn TaskStore>,
}

impl Reconciler {
    pub fn new(checks: Arc<dyn CheckStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { checks, tasks }
    }

    /// Commit a check plan: flag overridden direct checks, retire stale
    /// managed checks, revive returning ones, then materialize creations.
    pub fn apply_check_plan(
        &self,
        agent: &Agent,
        plan: &CheckPlan,
    ) -> Result<ApplyReport, CascadeError> {
        let mut report = ApplyReport::default();

        for id in &plan.overridden {
            self.checks.mark_check_overridden(*id)?;
            report.overridden += 1;
        }

        for retirement in &plan.retirements {
            match retirement.action {
                RetireAction::Delete => self.checks.delete_check(retirement.id)?,
                RetireAction::MarkPendingDeletion => self
                    .checks
                    .set_check_sync_status(retirement.id, SyncStatus::PendingDeletion)?,
            }
            report.retired += 1;
        }

        for id in &plan.revivals {
            self.checks.set_check_sync_status(*id, SyncStatus::NotSynced)?;
            report.revived += 1;
        }

        for template in &plan.creations {
            match self.checks.create_policy_check(template, agent) {
                Ok(_) => report.created += 1,
                Err(error) => {
                    warn!(
                        agent = %agent.id,
                        template = %template.id,
                        %error,
                        "policy check creation failed; will retry on next resolution"
                    );
                    report.failed_creations += 1;
                }
            }
        }

        debug!(agent = %agent.id, ?report, "check plan applied");
        Ok(report)
    }

    /// Commit a task plan. Mirrors [`Self::apply_check_plan`]; tasks have no
    /// override flag.
    pub fn apply_task_plan(
        &self,
        agent: &Agent,
        plan: &TaskPlan,
    ) -> Result<ApplyReport, CascadeError> {
        let mut report = ApplyReport::default();

        for retirement in &plan.retirements {
            match retirement.action {
                RetireAction::Delete => self.tasks.delete_task(retirement.id)?,
                RetireAction::MarkPendingDeletion => self
                    .tasks
                    .set_task_sync_status(retirement.id, SyncStatus::PendingDeletion)?,
            }
            report.retired += 1;
        }

        for id in &plan.revivals {
            self.tasks.set_task_sync_status(*id, SyncStatus::NotSynced)?;
            report.revived += 1;
        }

        for template in &plan.creations {
            match self.tasks.create_policy_task(template, agent) {
                Ok(_) => report.created += 1,
                Err(error) => {
                    warn!(
                        agent = %agent.id,
                        template = %template.id,
                        %error,
                        "policy task creation failed; will retry on next resolution"
                    );
                    report.failed_creations += 1;
                }
            }
        }

        debug!(agent = %agent.id, ?report, "task plan applied");
        Ok(report)
    }
}
