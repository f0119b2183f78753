//! Claim scheduler: picks a lawyer for a published task and takes the claim.
//!
//! For each ranked candidate, one transaction consumes the lawyer's daily
//! quota, moves the task `published -> claimed` conditionally, and opens the
//! assignment. If the task update loses a race the transaction rolls back,
//! so the quota increment disappears with it.

use std::collections::HashMap;
use std::sync::Arc;

use casework_core::error::CoreError;
use casework_core::quota::ActorKind;
use casework_core::scoring::{rank_candidates, CandidateProfile, DEFAULT_APPROVAL_RATE};
use casework_core::status::TaskStatus;
use casework_core::task::TaskType;
use casework_core::types::DbId;
use casework_db::models::assignment::Assignment;
use casework_db::models::task::Task;
use casework_db::repositories::{AssignmentRepo, LawyerRepo, QuotaRepo, TaskRepo};
use casework_db::DbPool;
use casework_events::{event_types, EventBus, PlatformEvent};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::retry::with_retry;
use crate::workload::WorkloadTracker;

/// A successful claim.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub task: Task,
    pub assignment: Assignment,
}

pub struct ClaimScheduler {
    pool: DbPool,
    config: Arc<EngineConfig>,
    workload: Arc<WorkloadTracker>,
    events: Arc<EventBus>,
}

impl ClaimScheduler {
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

    /// Claim `task_id` for the best eligible lawyer.
    ///
    /// With `preferred_lawyer_id` the candidate set is that lawyer alone and
    /// an exhausted quota is reported as `QuotaExhausted` rather than
    /// `NoEligibleLawyer`.
    pub async fn claim(
        &self,
        task_id: DbId,
        preferred_lawyer_id: Option<DbId>,
        actor_user_id: Option<DbId>,
    ) -> EngineResult<ClaimOutcome> {
        let outcome = with_retry(&self.config.retry, "claim", move || {
            self.try_claim(task_id, preferred_lawyer_id)
        })
        .await?;

        self.workload.refresh_quietly(outcome.assignment.lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_types::TASK_CLAIMED)
                .with_source("task", task_id)
                .with_optional_actor(actor_user_id)
                .with_payload(serde_json::json!({
                    "lawyer_id": outcome.assignment.lawyer_id,
                    "assignment_id": outcome.assignment.id,
                })),
        );
        Ok(outcome)
    }

    async fn try_claim(&self, task_id: DbId, preferred_lawyer_id: Option<DbId>) -> EngineResult<ClaimOutcome> {
        let task = TaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        if task.status_id != TaskStatus::Published.id() {
            return Err(CoreError::TaskUnavailable(task_id).into());
        }
        let task_type = TaskType::parse(&task.task_type)?;

        let rows = LawyerRepo::list_candidates(
            &self.pool,
            task_type,
            task.region.as_deref(),
            preferred_lawyer_id,
        )
        .await?;
        if rows.is_empty() {
            tracing::info!(task_id, ?preferred_lawyer_id, "No eligible lawyer for task");
            return Err(CoreError::NoEligibleLawyer(task_id).into());
        }

        let limits: HashMap<DbId, i32> = rows
            .iter()
            .map(|r| (r.lawyer_id, self.config.lawyer_limit(r.daily_claim_limit)))
            .collect();
        let profiles = rows
            .into_iter()
            .map(|r| CandidateProfile {
                lawyer_id: r.lawyer_id,
                specialties: r.specialties.0,
                workload_score: r.current_workload_score.unwrap_or(0.0),
                approval_rate: r.approval_rate.unwrap_or(DEFAULT_APPROVAL_RATE),
                last_assignment_at: r.last_assignment_at,
            })
            .collect();
        let ranked = rank_candidates(profiles, &task.required_skills.0);

        let mut exhausted: Option<(DbId, i32)> = None;

        for candidate in ranked {
            let lawyer_id = candidate.lawyer_id;
            let limit = limits
                .get(&lawyer_id)
                .copied()
                .unwrap_or(self.config.lawyer_daily_limit);

            let mut tx = self.pool.begin().await?;

            let date = QuotaRepo::current_date(&mut tx).await?;
            let quota = QuotaRepo::try_consume(&mut tx, ActorKind::Lawyer, lawyer_id, date, limit).await?;
            if !quota.ok {
                tx.rollback().await?;
                tracing::debug!(task_id, lawyer_id, max = quota.max, "Lawyer quota exhausted, trying next");
                exhausted = Some((lawyer_id, quota.max));
                continue;
            }

            let Some(claimed) = TaskRepo::mark_claimed(&mut tx, task_id, lawyer_id).await? else {
                tx.rollback().await?;
                tracing::info!(task_id, lawyer_id, "Task claimed concurrently");
                return Err(CoreError::TaskUnavailable(task_id).into());
            };
            let assignment = AssignmentRepo::open(&mut tx, task_id, lawyer_id).await?;
            LawyerRepo::touch_last_assignment(&mut tx, lawyer_id).await?;
            tx.commit().await?;

            tracing::info!(
                task_id,
                lawyer_id,
                assignment_id = assignment.id,
                quota_remaining = quota.remaining,
                "Task claimed",
            );
            return Ok(ClaimOutcome {
                task: claimed,
                assignment,
            });
        }

        match (preferred_lawyer_id, exhausted) {
            (Some(_), Some((actor_id, max))) => Err(CoreError::QuotaExhausted {
                kind: ActorKind::Lawyer,
                actor_id,
                max,
            }
            .into()),
            _ => {
                tracing::info!(task_id, "Every eligible lawyer has exhausted today's quota");
                Err(CoreError::NoEligibleLawyer(task_id).into())
            }
        }
    }
}
