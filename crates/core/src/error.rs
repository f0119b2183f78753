use crate::quota::ActorKind;
use crate::status::ReviewStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The task is no longer in a claimable state. Callers should re-poll.
    #[error("Task {0} is no longer available")]
    TaskUnavailable(DbId),

    /// The actor has used up today's quota. Not retried the same day.
    #[error("Daily {kind} quota exhausted for {actor_id} (limit {max})")]
    QuotaExhausted {
        kind: ActorKind,
        actor_id: DbId,
        max: i32,
    },

    #[error("No eligible lawyer available for task {0}")]
    NoEligibleLawyer(DbId),

    /// The requested action does not apply to the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Lawyer {lawyer_id} is not the assignee of task {task_id}")]
    NotAssignee { task_id: DbId, lawyer_id: DbId },

    #[error("Illegal review transition: {from} -> {to}")]
    IllegalTransition {
        from: ReviewStatus,
        to: ReviewStatus,
    },

    #[error("A comment is required when moving to {0}")]
    MissingComment(ReviewStatus),
}
