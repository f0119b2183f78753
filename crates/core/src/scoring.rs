//! Workload scoring and candidate ranking for the claim scheduler.
//!
//! Pure functions only. The engine feeds them rows loaded from the store.

use std::cmp::Ordering;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Weight of the active-case ratio in the workload score.
pub const WORKLOAD_WEIGHT_ACTIVE: f64 = 0.7;

/// Weight of the pending-review ratio in the workload score.
pub const WORKLOAD_WEIGHT_REVIEWS: f64 = 0.3;

/// Pending reviews at which the review component saturates.
pub const MAX_PENDING_REVIEWS_FOR_SCORING: i32 = 10;

/// Default cap on concurrently held tasks for a lawyer with no workload row.
pub const DEFAULT_MAX_CONCURRENT_TASKS: i32 = 5;

/// Approval rate assumed when a lawyer has no review decisions yet.
pub const DEFAULT_APPROVAL_RATE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Workload score
// ---------------------------------------------------------------------------

/// Composite workload score in `0.0..=1.0`; 0 is idle, 1 is saturated.
///
/// A non-positive `max_concurrent` is treated as already full.
pub fn calculate_workload_score(active_cases: i32, pending_reviews: i32, max_concurrent: i32) -> f64 {
    let active_norm = if max_concurrent <= 0 {
        1.0
    } else {
        (active_cases.max(0) as f64 / max_concurrent as f64).clamp(0.0, 1.0)
    };
    let review_norm = (pending_reviews.max(0) as f64 / MAX_PENDING_REVIEWS_FOR_SCORING as f64)
        .clamp(0.0, 1.0);
    (WORKLOAD_WEIGHT_ACTIVE * active_norm + WORKLOAD_WEIGHT_REVIEWS * review_norm).clamp(0.0, 1.0)
}

/// Share of approving decisions among all decisions.
///
/// `approved` counts reviews that reached approved, authorized or sent.
pub fn calculate_approval_rate(approved: i64, rejected: i64) -> f64 {
    let total = approved.max(0) + rejected.max(0);
    if total == 0 {
        return DEFAULT_APPROVAL_RATE;
    }
    approved.max(0) as f64 / total as f64
}

/// A lawyer can take another case while under the concurrency cap.
pub fn is_available(active_cases: i32, max_concurrent: i32, profile_active: bool) -> bool {
    profile_active && active_cases < max_concurrent
}

// ---------------------------------------------------------------------------
// Specialty match
// ---------------------------------------------------------------------------

/// Count how many of `required` skills appear in `specialties`.
pub fn count_matching_skills(specialties: &[String], required: &[String]) -> usize {
    required
        .iter()
        .filter(|req| specialties.iter().any(|s| s == *req))
        .count()
}

/// Fraction of required skills covered. An empty requirement is a full match.
pub fn specialty_match(specialties: &[String], required: &[String]) -> f64 {
    if required.is_empty() {
        return 1.0;
    }
    count_matching_skills(specialties, required) as f64 / required.len() as f64
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Everything the ranking needs to know about one eligible lawyer.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProfile {
    pub lawyer_id: DbId,
    pub specialties: Vec<String>,
    pub workload_score: f64,
    pub approval_rate: f64,
    pub last_assignment_at: Option<Timestamp>,
}

/// Order two candidates, best first.
///
/// Lower workload wins, then higher approval rate, then better specialty
/// match, then the lawyer who has waited longest since an assignment (never
/// assigned sorts first). Lawyer id makes the order total.
pub fn compare_candidates(a: &CandidateProfile, b: &CandidateProfile, required: &[String]) -> Ordering {
    a.workload_score
        .total_cmp(&b.workload_score)
        .then_with(|| b.approval_rate.total_cmp(&a.approval_rate))
        .then_with(|| {
            specialty_match(&b.specialties, required)
                .total_cmp(&specialty_match(&a.specialties, required))
        })
        .then_with(|| match (a.last_assignment_at, b.last_assignment_at) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        })
        .then_with(|| a.lawyer_id.cmp(&b.lawyer_id))
}

/// Sort candidates best first.
pub fn rank_candidates(mut candidates: Vec<CandidateProfile>, required: &[String]) -> Vec<CandidateProfile> {
    candidates.sort_by(|a, b| compare_candidates(a, b, required));
    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
