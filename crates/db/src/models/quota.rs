use casework_core::types::{DbId, QuotaDate};
use sqlx::FromRow;

/// One actor's counter for one day, read from either quota table.
///
/// Both tables are projected onto these column names by `QuotaRepo`.
#[derive(Debug, Clone, FromRow)]
pub struct DailyLimitRow {
    pub actor_id: DbId,
    pub limit_date: QuotaDate,
    pub used: i32,
    pub max_daily_limit: i32,
}

/// Outcome of a consume attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumeOutcome {
    pub ok: bool,
    pub remaining: i32,
    pub max: i32,
}
