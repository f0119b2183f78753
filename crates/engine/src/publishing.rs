//! Task publisher: creates tasks and moves them `pending -> published` or
//! `-> cancelled`, charging the creator's daily publish quota.

use std::sync::Arc;

use casework_core::error::CoreError;
use casework_core::quota::ActorKind;
use casework_core::status::TaskStatus;
use casework_core::task::{
    validate_amount_cents, validate_required_skills, validate_title, validate_transition,
};
use casework_core::types::DbId;
use casework_db::models::task::{CreateTask, Task};
use casework_db::repositories::{QuotaRepo, TaskRepo};
use casework_db::DbPool;
use casework_events::{event_types, EventBus, PlatformEvent};

use crate::config::EngineConfig;
use crate::error::EngineResult;

/// Who is publishing, and whether their publish quota applies.
#[derive(Debug, Clone, Copy)]
pub struct Publisher {
    pub user_id: DbId,
    /// `false` for operators ingesting cases on behalf of the system.
    pub metered: bool,
}

pub struct TaskPublisher {
    pool: DbPool,
    config: Arc<EngineConfig>,
    events: Arc<EventBus>,
}

impl TaskPublisher {
    pub fn new(pool: DbPool, config: Arc<EngineConfig>, events: Arc<EventBus>) -> Self {
        Self {
            pool,
            config,
            events,
        }
    }

    /// Create a task, publishing it in the same transaction unless
    /// `input.publish == Some(false)`.
    pub async fn create(&self, input: &CreateTask, publisher: Publisher) -> EngineResult<Task> {
        validate_title(&input.title)?;
        validate_amount_cents(input.amount_cents.unwrap_or(0))?;
        validate_required_skills(input.required_skills.as_deref().unwrap_or_default())?;

        // System ingestion of a source case has no human creator.
        let creator = match (publisher.metered, input.source_case_id) {
            (false, Some(_)) => None,
            _ => Some(publisher.user_id),
        };

        let mut tx = self.pool.begin().await?;
        let mut task = TaskRepo::create(&mut tx, creator, input).await?;
        let publish = input.publish.unwrap_or(true);
        if publish {
            self.charge_quota(&mut tx, publisher).await?;
            task = TaskRepo::publish(&mut tx, task.id)
                .await?
                .ok_or_else(|| CoreError::Internal(format!("new task {} was not pending", task.id)))?;
        }
        tx.commit().await?;

        tracing::info!(
            task_id = task.id,
            task_type = %task.task_type,
            creator_user_id = ?task.creator_user_id,
            published = publish,
            "Task created",
        );
        self.events.publish(
            PlatformEvent::new(event_types::TASK_CREATED)
                .with_source("task", task.id)
                .with_actor(publisher.user_id)
                .with_payload(serde_json::json!({
                    "task_type": task.task_type,
                    "source_case_id": task.source_case_id,
                })),
        );
        if publish {
            self.publish_event(&task, publisher.user_id);
        }
        Ok(task)
    }

    /// `pending -> published`.
    pub async fn publish(&self, task_id: DbId, publisher: Publisher) -> EngineResult<Task> {
        let mut tx = self.pool.begin().await?;
        let current = TaskRepo::find_for_update(&mut tx, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        ensure_owner(&current, publisher)?;
        validate_transition(current_status(&current)?, TaskStatus::Published)?;

        self.charge_quota(&mut tx, publisher).await?;
        let task = TaskRepo::publish(&mut tx, task_id)
            .await?
            .ok_or_else(|| CoreError::InvalidState(format!("task {task_id} is no longer pending")))?;
        tx.commit().await?;

        tracing::info!(task_id, user_id = publisher.user_id, "Task published");
        self.publish_event(&task, publisher.user_id);
        Ok(task)
    }

    /// `pending | published -> cancelled`.
    pub async fn cancel(&self, task_id: DbId, publisher: Publisher) -> EngineResult<Task> {
        let current = TaskRepo::find_by_id(&self.pool, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        ensure_owner(&current, publisher)?;
        validate_transition(current_status(&current)?, TaskStatus::Cancelled)?;

        let task = TaskRepo::cancel(&self.pool, task_id)
            .await?
            .ok_or_else(|| CoreError::InvalidState(format!("task {task_id} was claimed concurrently")))?;

        tracing::info!(task_id, user_id = publisher.user_id, "Task cancelled");
        self.events.publish(
            PlatformEvent::new(event_types::TASK_CANCELLED)
                .with_source("task", task_id)
                .with_actor(publisher.user_id),
        );
        Ok(task)
    }

    async fn charge_quota(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        publisher: Publisher,
    ) -> EngineResult<()> {
        if !publisher.metered {
            return Ok(());
        }
        let date = QuotaRepo::current_date(tx).await?;
        let outcome = QuotaRepo::try_consume(
            tx,
            ActorKind::User,
            publisher.user_id,
            date,
            self.config.user_daily_publish_limit,
        )
        .await?;
        if !outcome.ok {
            tracing::info!(user_id = publisher.user_id, max = outcome.max, "Publish quota exhausted");
            return Err(CoreError::QuotaExhausted {
                kind: ActorKind::User,
                actor_id: publisher.user_id,
                max: outcome.max,
            }
            .into());
        }
        Ok(())
    }

    fn publish_event(&self, task: &Task, user_id: DbId) {
        self.events.publish(
            PlatformEvent::new(event_types::TASK_PUBLISHED)
                .with_source("task", task.id)
                .with_actor(user_id)
                .with_payload(serde_json::json!({
                    "task_type": task.task_type,
                    "urgency": task.urgency,
                    "region": task.region,
                })),
        );
    }
}

fn current_status(task: &Task) -> Result<TaskStatus, CoreError> {
    TaskStatus::from_id(task.status_id)
        .ok_or_else(|| CoreError::Internal(format!("task {} has unknown status {}", task.id, task.status_id)))
}

/// Metered users may only act on their own tasks.
fn ensure_owner(task: &Task, publisher: Publisher) -> Result<(), CoreError> {
    if publisher.metered && task.creator_user_id != Some(publisher.user_id) {
        return Err(CoreError::Forbidden(format!(
            "task {} belongs to another user",
            task.id
        )));
    }
    Ok(())
}
