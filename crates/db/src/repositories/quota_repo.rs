//! Repository for the daily quota ledgers (`lawyer_daily_limits` and
//! `user_daily_publish_limits`).
//!
//! The only mutation paths are the conditional increment in
//! [`QuotaRepo::try_consume`] and the floor-bounded decrement in
//! [`QuotaRepo::release`]. Rows are never deleted.

use casework_core::quota::{remaining, ActorKind};
use casework_core::types::{DbId, QuotaDate};
use sqlx::PgPool;

use crate::models::quota::{ConsumeOutcome, DailyLimitRow};

/// Table layout for one actor kind.
struct Ledger {
    table: &'static str,
    actor_col: &'static str,
    count_col: &'static str,
}

fn ledger(kind: ActorKind) -> Ledger {
    match kind {
        ActorKind::Lawyer => Ledger {
            table: "lawyer_daily_limits",
            actor_col: "lawyer_id",
            count_col: "grabbed_count",
        },
        ActorKind::User => Ledger {
            table: "user_daily_publish_limits",
            actor_col: "user_id",
            count_col: "published_count",
        },
    }
}

pub struct QuotaRepo;

impl QuotaRepo {
    /// The UTC calendar date of the transaction's `NOW()`.
    ///
    /// Rows stamped with `NOW()` in the same transaction (such as a task's
    /// `claimed_at`) fall on this date, so a later refund computed from the
    /// stamp hits the row charged here.
    pub async fn current_date(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<QuotaDate, sqlx::Error> {
        sqlx::query_scalar("SELECT (NOW() AT TIME ZONE 'UTC')::date")
            .fetch_one(&mut **tx)
            .await
    }

    /// Consume one unit of `actor_id`'s quota for `date`.
    ///
    /// Creates the day's row with `max` if absent, then increments only while
    /// `count < max_daily_limit`. The row's stored limit wins over `max` once
    /// the row exists. An exhausted quota returns `ok = false` and changes
    /// nothing.
    pub async fn try_consume(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: ActorKind,
        actor_id: DbId,
        date: QuotaDate,
        max: i32,
    ) -> Result<ConsumeOutcome, sqlx::Error> {
        let Ledger {
            table,
            actor_col,
            count_col,
        } = ledger(kind);

        sqlx::query(&format!(
            "INSERT INTO {table} ({actor_col}, limit_date, {count_col}, max_daily_limit) \
             VALUES ($1, $2, 0, $3) \
             ON CONFLICT ({actor_col}, limit_date) DO NOTHING"
        ))
        .bind(actor_id)
        .bind(date)
        .bind(max)
        .execute(&mut **tx)
        .await?;

        let bumped: Option<(i32, i32)> = sqlx::query_as(&format!(
            "UPDATE {table} SET {count_col} = {count_col} + 1 \
             WHERE {actor_col} = $1 AND limit_date = $2 AND {count_col} < max_daily_limit \
             RETURNING {count_col}, max_daily_limit"
        ))
        .bind(actor_id)
        .bind(date)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some((used, max)) = bumped {
            return Ok(ConsumeOutcome {
                ok: true,
                remaining: remaining(used, max),
                max,
            });
        }

        let (used, max): (i32, i32) = sqlx::query_as(&format!(
            "SELECT {count_col}, max_daily_limit FROM {table} \
             WHERE {actor_col} = $1 AND limit_date = $2"
        ))
        .bind(actor_id)
        .bind(date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(ConsumeOutcome {
            ok: false,
            remaining: remaining(used, max),
            max,
        })
    }

    /// Give back one unit for `date`, never going below zero.
    ///
    /// Returns `false` when there was no row or it was already at zero.
    pub async fn release(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        kind: ActorKind,
        actor_id: DbId,
        date: QuotaDate,
    ) -> Result<bool, sqlx::Error> {
        let Ledger {
            table,
            actor_col,
            count_col,
        } = ledger(kind);

        let result = sqlx::query(&format!(
            "UPDATE {table} SET {count_col} = {count_col} - 1 \
             WHERE {actor_col} = $1 AND limit_date = $2 AND {count_col} > 0"
        ))
        .bind(actor_id)
        .bind(date)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Read the day's row, if one has been created.
    pub async fn find(
        pool: &PgPool,
        kind: ActorKind,
        actor_id: DbId,
        date: QuotaDate,
    ) -> Result<Option<DailyLimitRow>, sqlx::Error> {
        let Ledger {
            table,
            actor_col,
            count_col,
        } = ledger(kind);

        sqlx::query_as::<_, DailyLimitRow>(&format!(
            "SELECT {actor_col} AS actor_id, limit_date, {count_col} AS used, max_daily_limit \
             FROM {table} WHERE {actor_col} = $1 AND limit_date = $2"
        ))
        .bind(actor_id)
        .bind(date)
        .fetch_optional(pool)
        .await
    }
}
