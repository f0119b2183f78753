//! Daily quota vocabulary shared by the ledger, the scheduler, and the API.
//!
//! Quota rows are keyed by UTC calendar date. A day's counter is never reset
//! in place; a new date simply starts a new row.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{QuotaDate, Timestamp};

/// Default number of claims a lawyer may take per day.
pub const DEFAULT_LAWYER_DAILY_LIMIT: i32 = 3;

/// Default number of tasks a user may publish per day.
pub const DEFAULT_USER_DAILY_PUBLISH_LIMIT: i32 = 5;

/// Upper bound accepted for a configured daily limit.
pub const MAX_CONFIGURABLE_DAILY_LIMIT: i32 = 1_000;

/// Which kind of actor a quota row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Bounds claims taken by a lawyer.
    Lawyer,
    /// Bounds tasks published by a user.
    User,
}

impl ActorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lawyer => "lawyer",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for ActorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one actor's quota for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub kind: ActorKind,
    pub date: QuotaDate,
    pub used: i32,
    pub max: i32,
    pub remaining: i32,
}

impl QuotaStatus {
    pub fn new(kind: ActorKind, date: QuotaDate, used: i32, max: i32) -> Self {
        Self {
            kind,
            date,
            used,
            max,
            remaining: remaining(used, max),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Slots left, never negative.
pub fn remaining(used: i32, max: i32) -> i32 {
    (max - used).max(0)
}

/// The quota day a timestamp falls on.
pub fn quota_date(at: Timestamp) -> QuotaDate {
    at.date_naive()
}

/// Validate a configured daily limit.
pub fn validate_daily_limit(limit: i32) -> Result<(), CoreError> {
    if !(1..=MAX_CONFIGURABLE_DAILY_LIMIT).contains(&limit) {
        return Err(CoreError::Validation(format!(
            "Daily limit must be between 1 and {MAX_CONFIGURABLE_DAILY_LIMIT}, got {limit}"
        )));
    }
    Ok(())
}
