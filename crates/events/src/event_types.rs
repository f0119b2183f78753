//! Dot-separated event names.

pub const TASK_CREATED: &str = "task.created";
pub const TASK_PUBLISHED: &str = "task.published";
pub const TASK_CANCELLED: &str = "task.cancelled";
pub const TASK_CLAIMED: &str = "task.claimed";
pub const TASK_ACCEPTED: &str = "task.accepted";
pub const TASK_REJECTED: &str = "task.rejected";
pub const TASK_OFFER_EXPIRED: &str = "task.offer_expired";
pub const TASK_COMPLETED: &str = "task.completed";

pub const REVIEW_CREATED: &str = "review.created";
pub const REVIEW_TRANSITIONED: &str = "review.transitioned";
pub const REVIEW_CONTENT_MODIFIED: &str = "review.content_modified";
pub const REVIEW_SIGNED: &str = "review.signed";

/// Consumed by the external dispatch collaborator to deliver the document.
pub const REVIEW_DOCUMENT_SENT: &str = "review.document_sent";
