//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` or `&mut Transaction` as the first argument. State changes are
//! conditional updates on the current status; a `None` / `false` result means
//! the row was not in the expected state.

pub mod assignment_repo;
pub mod lawyer_repo;
pub mod quota_repo;
pub mod review_log_repo;
pub mod review_task_repo;
pub mod task_repo;
pub mod workload_repo;

pub use assignment_repo::AssignmentRepo;
pub use lawyer_repo::LawyerRepo;
pub use quota_repo::QuotaRepo;
pub use review_log_repo::ReviewLogRepo;
pub use review_task_repo::ReviewTaskRepo;
pub use task_repo::TaskRepo;
pub use workload_repo::WorkloadRepo;

/// Default page size for list endpoints.
pub(crate) const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list endpoints.
pub(crate) const MAX_LIMIT: i64 = 100;

/// Clamp caller-supplied pagination to sane bounds.
pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}
