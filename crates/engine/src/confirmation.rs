//! Assignment confirmation: the assigned lawyer accepts or rejects an offer,
//! stale offers expire, and accepted work is completed.
//!
//! Each operation locks the task row, checks the caller against it, and
//! applies its conditional updates in one transaction.

use std::sync::Arc;

use casework_core::error::CoreError;
use casework_core::quota::{quota_date, ActorKind};
use casework_core::status::TaskStatus;
use casework_core::task::{validate_reason, AssignmentResolution, ConfirmAction};
use casework_core::types::DbId;
use casework_db::models::assignment::Assignment;
use casework_db::models::task::Task;
use casework_db::repositories::{AssignmentRepo, QuotaRepo, TaskRepo};
use casework_db::DbPool;
use casework_events::{event_types, EventBus, PlatformEvent};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::retry::with_retry;
use crate::workload::WorkloadTracker;

/// Maximum stale offers expired per sweep cycle.
const SWEEP_BATCH_SIZE: i64 = 100;

/// Reason recorded on offers closed by the timeout sweep.
const EXPIRED_REASON: &str = "offer not confirmed before timeout";

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub task: Task,
    pub assignment: Assignment,
}

pub struct AssignmentConfirmation {
    pool: DbPool,
    config: Arc<EngineConfig>,
    workload: Arc<WorkloadTracker>,
    events: Arc<EventBus>,
}

impl AssignmentConfirmation {
    pub fn new(
        pool: DbPool,
        config: Arc<EngineConfig>,
        workload: Arc<WorkloadTracker>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            pool,
            config,
            workload,
            events,
        }
    }

    /// Accept or reject the offer `lawyer_id` holds on `task_id`.
    ///
    /// Reject returns the task to the pool and refunds the quota of the
    /// claim's day. A second confirm on a resolved offer is `InvalidState`.
    pub async fn confirm(
        &self,
        task_id: DbId,
        lawyer_id: DbId,
        action: ConfirmAction,
        reason: Option<&str>,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<ConfirmOutcome> {
        validate_reason(reason)?;

        let outcome = with_retry(&self.config.retry, "confirm", move || {
            self.try_confirm(task_id, lawyer_id, action, reason)
        })
        .await?;

        let event_type = match action {
            ConfirmAction::Accept => event_types::TASK_ACCEPTED,
            ConfirmAction::Reject => event_types::TASK_REJECTED,
        };
        tracing::info!(task_id, lawyer_id, ?action, "Offer confirmed");

        self.workload.refresh_quietly(lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_type)
                .with_source("task", task_id)
                .with_optional_actor(actor_user_id)
                .with_payload(serde_json::json!({
                    "lawyer_id": lawyer_id,
                    "reason": reason,
                })),
        );
        Ok(outcome)
    }

    async fn try_confirm(
        &self,
        task_id: DbId,
        lawyer_id: DbId,
        action: ConfirmAction,
        reason: Option<&str>,
    ) -> EngineResult<ConfirmOutcome> {
        let mut tx = self.pool.begin().await?;
        let current = TaskRepo::find_for_update(&mut tx, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        ensure_assignee(&current, lawyer_id)?;
        if current.status_id != TaskStatus::Claimed.id() {
            return Err(invalid_status(&current, "confirmed").into());
        }

        let outcome = match action {
            ConfirmAction::Accept => {
                let task = TaskRepo::accept(&mut tx, task_id, lawyer_id)
                    .await?
                    .ok_or_else(|| invalid_status(&current, "accepted"))?;
                let assignment = AssignmentRepo::resolve(
                    &mut tx,
                    task_id,
                    lawyer_id,
                    AssignmentResolution::Accepted,
                    reason,
                )
                .await?
                .ok_or_else(|| CoreError::InvalidState(format!("task {task_id} has no open offer")))?;
                ConfirmOutcome { task, assignment }
            }
            ConfirmAction::Reject => {
                release_claim(&mut tx, &current, lawyer_id, AssignmentResolution::Rejected, reason).await?
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Expire every offer older than the configured timeout, as an implicit
    /// reject. Returns how many offers were expired.
    pub async fn expire_stale_offers(&self) -> EngineResult<usize> {
        let timeout = chrono::Duration::from_std(self.config.offer_timeout)
            .map_err(|e| CoreError::Internal(format!("offer timeout out of range: {e}")))?;
        let cutoff = chrono::Utc::now() - timeout;
        let stale = TaskRepo::list_stale_claims(&self.pool, cutoff, SWEEP_BATCH_SIZE).await?;

        let mut expired = 0;
        for task in stale {
            let Some(lawyer_id) = task.assigned_lawyer_id else {
                continue;
            };
            match self.expire_one(task.id, lawyer_id, cutoff).await {
                Ok(true) => {
                    expired += 1;
                    tracing::info!(task_id = task.id, lawyer_id, "Offer expired");
                    self.workload.refresh_quietly(lawyer_id).await;
                    self.events.publish(
                        PlatformEvent::new(event_types::TASK_OFFER_EXPIRED)
                            .with_source("task", task.id)
                            .with_payload(serde_json::json!({ "lawyer_id": lawyer_id })),
                    );
                }
                Ok(false) => {}
                Err(e) => tracing::error!(task_id = task.id, error = %e, "Failed to expire offer"),
            }
        }
        Ok(expired)
    }

    /// Expire one offer if it is still the same stale claim. `false` when the
    /// lawyer confirmed in the meantime.
    async fn expire_one(
        &self,
        task_id: DbId,
        lawyer_id: DbId,
        cutoff: casework_core::types::Timestamp,
    ) -> EngineResult<bool> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = TaskRepo::find_for_update(&mut tx, task_id).await? else {
            return Ok(false);
        };
        let still_stale = current.status_id == TaskStatus::Claimed.id()
            && current.assigned_lawyer_id == Some(lawyer_id)
            && current.claimed_at.is_some_and(|at| at < cutoff);
        if !still_stale {
            return Ok(false);
        }

        release_claim(
            &mut tx,
            &current,
            lawyer_id,
            AssignmentResolution::Expired,
            Some(EXPIRED_REASON),
        )
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    /// Periodic offer sweep until `cancel` fires.
    pub async fn run_offer_sweep(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.offer_sweep_interval);
        tracing::info!(
            interval_secs = self.config.offer_sweep_interval.as_secs(),
            timeout_secs = self.config.offer_timeout.as_secs(),
            "Offer timeout sweep started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Offer timeout sweep shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.expire_stale_offers().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(expired = n, "Offer sweep expired stale offers"),
                        Err(e) => tracing::error!(error = %e, "Offer sweep failed"),
                    }
                }
            }
        }
    }

    /// `accepted -> completed`, by the assignee.
    pub async fn complete(
        &self,
        task_id: DbId,
        lawyer_id: DbId,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<Task> {
        let mut tx = self.pool.begin().await?;
        let current = TaskRepo::find_for_update(&mut tx, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        ensure_assignee(&current, lawyer_id)?;
        let task = TaskRepo::complete(&mut tx, task_id, Some(lawyer_id))
            .await?
            .ok_or_else(|| invalid_status(&current, "completed"))?;
        tx.commit().await?;

        tracing::info!(task_id, lawyer_id, "Task completed");
        self.workload.refresh_quietly(lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_types::TASK_COMPLETED)
                .with_source("task", task_id)
                .with_optional_actor(actor_user_id)
                .with_payload(serde_json::json!({ "lawyer_id": lawyer_id })),
        );
        Ok(task)
    }
}

/// Return a claimed task to the pool, refund the claim day's quota, and
/// resolve the open offer.
async fn release_claim(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    current: &Task,
    lawyer_id: DbId,
    resolution: AssignmentResolution,
    reason: Option<&str>,
) -> EngineResult<ConfirmOutcome> {
    let task = TaskRepo::release(tx, current.id, lawyer_id)
        .await?
        .ok_or_else(|| invalid_status(current, "released"))?;

    let claimed_at = current.claimed_at.ok_or_else(|| {
        CoreError::Internal(format!("claimed task {} has no claimed_at", current.id))
    })?;
    if !QuotaRepo::release(tx, ActorKind::Lawyer, lawyer_id, quota_date(claimed_at)).await? {
        tracing::warn!(task_id = current.id, lawyer_id, "No quota to refund for released claim");
    }

    let assignment = AssignmentRepo::resolve(tx, current.id, lawyer_id, resolution, reason)
        .await?
        .ok_or_else(|| CoreError::InvalidState(format!("task {} has no open offer", current.id)))?;

    Ok(ConfirmOutcome { task, assignment })
}

/// A task held by someone else is `NotAssignee`; an unheld task falls
/// through to the status check.
fn ensure_assignee(task: &Task, lawyer_id: DbId) -> Result<(), CoreError> {
    match task.assigned_lawyer_id {
        Some(assignee) if assignee != lawyer_id => Err(CoreError::NotAssignee {
            task_id: task.id,
            lawyer_id,
        }),
        _ => Ok(()),
    }
}

fn invalid_status(task: &Task, verb: &str) -> CoreError {
    let status = TaskStatus::from_id(task.status_id)
        .map(|s| s.as_str())
        .unwrap_or("unknown");
    CoreError::InvalidState(format!("task {} is {status} and cannot be {verb}", task.id))
}
