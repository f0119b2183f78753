//! Review workflow: drives a drafted document from `pending` to `sent`.
//!
//! Every accepted transition is one conditional status update plus one log
//! row in the same transaction. A rejected call writes nothing.

use std::sync::Arc;

use casework_core::diff::ContentDiff;
use casework_core::error::CoreError;
use casework_core::review::{
    can_attach_signature, validate_comment, validate_content, validate_priority,
    validate_signature, validate_transition, TransitionContext, AUTO_APPROVE_PATH,
};
use casework_core::status::ReviewStatus;
use casework_core::types::DbId;
use casework_db::models::review::{
    CreateReviewTask, DocumentReviewLog, DocumentReviewTask, NewReviewLog,
};
use casework_db::repositories::{LawyerRepo, ReviewLogRepo, ReviewTaskRepo, TaskRepo};
use casework_db::DbPool;
use casework_events::{event_types, EventBus, PlatformEvent};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::retry::with_retry;
use crate::workload::WorkloadTracker;

/// Comment written on the log rows of an auto-approved document.
const AUTO_APPROVE_COMMENT: &str = "auto-approved on creation";

pub struct ReviewWorkflow {
    pool: DbPool,
    config: Arc<EngineConfig>,
    workload: Arc<WorkloadTracker>,
    events: Arc<EventBus>,
}

impl ReviewWorkflow {
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

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Create a review task. An `auto_approve` task is walked to `approved`
    /// in the same transaction, with one log row per step.
    pub async fn create(&self, creator_id: DbId, input: &CreateReviewTask) -> EngineResult<DocumentReviewTask> {
        if let Some(priority) = input.priority {
            validate_priority(priority)?;
        }
        validate_content(&input.content)?;
        if input.document_type.trim().is_empty() {
            return Err(CoreError::Validation("Document type must not be empty".to_string()).into());
        }
        if LawyerRepo::find_by_id(&self.pool, input.lawyer_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Lawyer",
                id: input.lawyer_id,
            }
            .into());
        }

        let mut tx = self.pool.begin().await?;
        let mut review = ReviewTaskRepo::create(&mut tx, creator_id, input).await?;

        if input.auto_approve {
            for to in AUTO_APPROVE_PATH {
                let from = status_of(&review)?;
                review = ReviewTaskRepo::transition(&mut tx, review.id, from, to)
                    .await?
                    .ok_or_else(|| CoreError::Internal(format!("review {} moved during creation", review.id)))?;
                ReviewLogRepo::insert(
                    &mut tx,
                    &NewReviewLog {
                        review_task_id: review.id,
                        old_status_id: from.id(),
                        new_status_id: to.id(),
                        actor_user_id: creator_id,
                        comment: Some(AUTO_APPROVE_COMMENT),
                        content_diff: None,
                    },
                )
                .await?;
            }
        }
        tx.commit().await?;

        tracing::info!(
            review_task_id = review.id,
            task_number = %review.task_number,
            lawyer_id = review.lawyer_id,
            auto_approve = review.auto_approve,
            "Review task created",
        );
        self.workload.refresh_quietly(review.lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_types::REVIEW_CREATED)
                .with_source("review_task", review.id)
                .with_actor(creator_id)
                .with_payload(serde_json::json!({
                    "task_number": review.task_number,
                    "lawyer_id": review.lawyer_id,
                    "status": status_of(&review)?,
                })),
        );
        Ok(review)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Move a review task to `to`.
    ///
    /// Fails with `IllegalTransition` for an edge not in the table,
    /// `MissingComment` when a modification request has no comment, and
    /// `InvalidState` when authorization lacks a required signature or the
    /// task changed underneath the caller.
    pub async fn transition(
        &self,
        review_task_id: DbId,
        to: ReviewStatus,
        actor_user_id: DbId,
        comment: Option<&str>,
    ) -> EngineResult<DocumentReviewTask> {
        let (from, review, completed_task) = with_retry(&self.config.retry, "review_transition", move || {
            self.try_transition(review_task_id, to, actor_user_id, comment)
        })
        .await?;

        tracing::info!(review_task_id, %from, %to, actor_user_id, "Review transitioned");
        self.workload.refresh_quietly(review.lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_types::REVIEW_TRANSITIONED)
                .with_source("review_task", review_task_id)
                .with_actor(actor_user_id)
                .with_payload(serde_json::json!({ "from": from, "to": to })),
        );
        if to == ReviewStatus::Sent {
            self.events.publish(
                PlatformEvent::new(event_types::REVIEW_DOCUMENT_SENT)
                    .with_source("review_task", review_task_id)
                    .with_actor(actor_user_id)
                    .with_payload(serde_json::json!({
                        "task_number": review.task_number,
                        "case_id": review.case_id,
                        "order_id": review.order_id,
                        "document_type": review.document_type,
                    })),
            );
        }
        if let Some(task_id) = completed_task {
            tracing::info!(task_id, review_task_id, "Task completed by sent document");
            self.events.publish(
                PlatformEvent::new(event_types::TASK_COMPLETED)
                    .with_source("task", task_id)
                    .with_actor(actor_user_id)
                    .with_payload(serde_json::json!({ "review_task_id": review_task_id })),
            );
        }
        Ok(review)
    }

    async fn try_transition(
        &self,
        review_task_id: DbId,
        to: ReviewStatus,
        actor_user_id: DbId,
        comment: Option<&str>,
    ) -> EngineResult<(ReviewStatus, DocumentReviewTask, Option<DbId>)> {
        let current = self.find(review_task_id).await?;
        let from = status_of(&current)?;
        validate_transition(
            from,
            to,
            &TransitionContext {
                comment,
                requires_signature: current.requires_signature,
                has_signature: current.signature.is_some(),
            },
        )?;

        let mut tx = self.pool.begin().await?;
        let review = ReviewTaskRepo::transition(&mut tx, review_task_id, from, to)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState(format!(
                    "review task {review_task_id} is no longer {from}"
                ))
            })?;
        ReviewLogRepo::insert(
            &mut tx,
            &NewReviewLog {
                review_task_id,
                old_status_id: from.id(),
                new_status_id: to.id(),
                actor_user_id,
                comment,
                content_diff: None,
            },
        )
        .await?;

        let mut completed_task = None;
        if to == ReviewStatus::Sent {
            if let Some(task_id) = review.task_id {
                completed_task = TaskRepo::complete(&mut tx, task_id, None).await?.map(|t| t.id);
            }
        }
        tx.commit().await?;

        Ok((from, review, completed_task))
    }

    /// Replace the document body. Only valid in `modification_requested`;
    /// moves the task to `modified` and logs a diff summary.
    pub async fn modify_content(
        &self,
        review_task_id: DbId,
        actor_user_id: DbId,
        content: &str,
        comment: Option<&str>,
    ) -> EngineResult<DocumentReviewTask> {
        validate_content(content)?;
        validate_comment(comment)?;

        let current = self.find(review_task_id).await?;
        let from = status_of(&current)?;
        validate_transition(
            from,
            ReviewStatus::Modified,
            &TransitionContext {
                comment,
                ..Default::default()
            },
        )?;
        let diff = ContentDiff::summarize(&current.current_content, content);

        let mut tx = self.pool.begin().await?;
        let review = ReviewTaskRepo::modify_content(&mut tx, review_task_id, content)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState(format!(
                    "review task {review_task_id} is no longer {from}"
                ))
            })?;
        ReviewLogRepo::insert(
            &mut tx,
            &NewReviewLog {
                review_task_id,
                old_status_id: from.id(),
                new_status_id: ReviewStatus::Modified.id(),
                actor_user_id,
                comment,
                content_diff: Some(diff.to_json()),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            review_task_id,
            actor_user_id,
            lines_added = diff.lines_added,
            lines_removed = diff.lines_removed,
            "Review content modified",
        );
        self.workload.refresh_quietly(review.lawyer_id).await;
        self.events.publish(
            PlatformEvent::new(event_types::REVIEW_CONTENT_MODIFIED)
                .with_source("review_task", review_task_id)
                .with_actor(actor_user_id)
                .with_payload(diff.to_json()),
        );
        Ok(review)
    }

    /// Attach a signature before authorization. Not a transition; no log row.
    pub async fn attach_signature(
        &self,
        review_task_id: DbId,
        actor_user_id: DbId,
        signature: &serde_json::Value,
    ) -> EngineResult<DocumentReviewTask> {
        validate_signature(signature)?;

        let current = self.find(review_task_id).await?;
        let status = status_of(&current)?;
        if !can_attach_signature(status) {
            return Err(CoreError::InvalidState(format!(
                "cannot sign review task {review_task_id} while {status}"
            ))
            .into());
        }

        let allowed: Vec<ReviewStatus> = ReviewStatus::ALL
            .iter()
            .copied()
            .filter(|s| can_attach_signature(*s))
            .collect();
        let review = ReviewTaskRepo::attach_signature(&self.pool, review_task_id, signature, &allowed)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidState(format!("review task {review_task_id} can no longer be signed"))
            })?;

        tracing::info!(review_task_id, actor_user_id, "Signature attached");
        self.events.publish(
            PlatformEvent::new(event_types::REVIEW_SIGNED)
                .with_source("review_task", review_task_id)
                .with_actor(actor_user_id),
        );
        Ok(review)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find(&self, review_task_id: DbId) -> EngineResult<DocumentReviewTask> {
        Ok(ReviewTaskRepo::find_by_id(&self.pool, review_task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "DocumentReviewTask",
                id: review_task_id,
            })?)
    }

    pub async fn list(
        &self,
        lawyer_id: Option<DbId>,
        status: Option<ReviewStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> EngineResult<Vec<DocumentReviewTask>> {
        Ok(ReviewTaskRepo::list(&self.pool, lawyer_id, status, limit, offset).await?)
    }

    /// Audit history in transition order.
    pub async fn logs(&self, review_task_id: DbId) -> EngineResult<Vec<DocumentReviewLog>> {
        self.find(review_task_id).await?;
        Ok(ReviewLogRepo::list_for_review(&self.pool, review_task_id).await?)
    }
}

fn status_of(review: &DocumentReviewTask) -> Result<ReviewStatus, CoreError> {
    ReviewStatus::from_id(review.status_id).ok_or_else(|| {
        CoreError::Internal(format!(
            "review task {} has unknown status {}",
            review.id, review.status_id
        ))
    })
}
