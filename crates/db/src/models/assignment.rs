use casework_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `task_assignments` table: one offer of a task to a lawyer.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Assignment {
    pub id: DbId,
    pub task_id: DbId,
    pub lawyer_id: DbId,
    pub offered_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
    /// `accepted`, `rejected` or `expired`; `None` while the offer is open.
    pub resolution: Option<String>,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

impl Assignment {
    pub fn is_open(&self) -> bool {
        self.resolved_at.is_none()
    }
}
