//! Read-side quota reporting.

use casework_core::quota::{quota_date, ActorKind, QuotaStatus};
use casework_core::types::DbId;
use casework_db::repositories::QuotaRepo;
use casework_db::DbPool;

use crate::error::EngineResult;

/// Today's (UTC) quota for an actor. `default_max` is reported when the
/// actor has not touched the ledger yet today.
pub async fn today(
    pool: &DbPool,
    kind: ActorKind,
    actor_id: DbId,
    default_max: i32,
) -> EngineResult<QuotaStatus> {
    let date = quota_date(chrono::Utc::now());
    let status = match QuotaRepo::find(pool, kind, actor_id, date).await? {
        Some(row) => QuotaStatus::new(kind, date, row.used, row.max_daily_limit),
        None => QuotaStatus::new(kind, date, 0, default_max),
    };
    Ok(status)
}
