//! Workload tracker: derives `lawyer_workloads` rows from tasks and reviews.
//!
//! The projection is advisory. Quota and claim correctness never read it,
//! so a failed refresh is logged and otherwise ignored.

use std::sync::Arc;

use casework_core::error::CoreError;
use casework_core::scoring::{calculate_approval_rate, calculate_workload_score, is_available};
use casework_core::types::DbId;
use casework_db::models::workload::{LawyerWorkload, UpsertWorkload};
use casework_db::repositories::{LawyerRepo, WorkloadRepo};
use casework_db::DbPool;
use tokio_util::sync::CancellationToken;

use crate::cache::TtlCache;
use crate::config::EngineConfig;
use crate::error::EngineResult;

pub struct WorkloadTracker {
    pool: DbPool,
    config: Arc<EngineConfig>,
    cache: TtlCache<DbId, LawyerWorkload>,
}

impl WorkloadTracker {
    pub fn new(pool: DbPool, config: Arc<EngineConfig>) -> Self {
        let cache = TtlCache::new(config.workload_cache_ttl, config.workload_cache_capacity);
        Self {
            pool,
            config,
            cache,
        }
    }

    /// Recompute and store the projection for one lawyer.
    pub async fn refresh(&self, lawyer_id: DbId) -> EngineResult<LawyerWorkload> {
        let lawyer = LawyerRepo::find_by_id(&self.pool, lawyer_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Lawyer",
                id: lawyer_id,
            })?;
        let counts = WorkloadRepo::compute_counts(&self.pool, lawyer_id).await?;

        let active_cases = i32::try_from(counts.active_cases).unwrap_or(i32::MAX);
        let pending_reviews = i32::try_from(counts.pending_reviews).unwrap_or(i32::MAX);
        let daily_capacity = self.config.lawyer_limit(lawyer.daily_claim_limit);

        let input = UpsertWorkload {
            lawyer_id,
            active_cases,
            pending_reviews,
            daily_capacity,
            weekly_capacity: daily_capacity.saturating_mul(7),
            average_review_time: counts.average_review_time,
            approval_rate: calculate_approval_rate(counts.approved_reviews, counts.rejected_reviews),
            is_available: is_available(active_cases, lawyer.max_concurrent_tasks, lawyer.is_active),
            max_concurrent_tasks: lawyer.max_concurrent_tasks,
            current_workload_score: calculate_workload_score(
                active_cases,
                pending_reviews,
                lawyer.max_concurrent_tasks,
            ),
            specialties: lawyer.specialties.0.clone(),
        };

        let workload = WorkloadRepo::upsert(&self.pool, &input).await?;
        self.cache.insert(lawyer_id, workload.clone()).await;

        tracing::debug!(
            lawyer_id,
            active_cases,
            pending_reviews,
            score = workload.current_workload_score,
            available = workload.is_available,
            "Workload refreshed",
        );
        Ok(workload)
    }

    /// Refresh after a mutation. Failures are logged, never returned.
    pub async fn refresh_quietly(&self, lawyer_id: DbId) {
        if let Err(e) = self.refresh(lawyer_id).await {
            self.cache.invalidate(&lawyer_id).await;
            tracing::warn!(lawyer_id, error = %e, "Workload refresh failed");
        }
    }

    /// Current workload, from cache, then store, then a fresh computation.
    pub async fn get(&self, lawyer_id: DbId) -> EngineResult<LawyerWorkload> {
        if let Some(hit) = self.cache.get(&lawyer_id).await {
            return Ok(hit);
        }
        if let Some(stored) = WorkloadRepo::find(&self.pool, lawyer_id).await? {
            self.cache.insert(lawyer_id, stored.clone()).await;
            return Ok(stored);
        }
        self.refresh(lawyer_id).await
    }

    /// Refresh every lawyer. Returns how many refreshed successfully.
    pub async fn refresh_all(&self) -> EngineResult<usize> {
        let ids = LawyerRepo::list_ids(&self.pool).await?;
        let mut refreshed = 0;
        for id in ids {
            match self.refresh(id).await {
                Ok(_) => refreshed += 1,
                Err(e) => tracing::warn!(lawyer_id = id, error = %e, "Workload refresh failed"),
            }
        }
        Ok(refreshed)
    }

    /// Periodic full refresh until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.workload_refresh_interval);
        tracing::info!(
            interval_secs = self.config.workload_refresh_interval.as_secs(),
            "Workload refresher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Workload refresher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match self.refresh_all().await {
                        Ok(n) => tracing::debug!(refreshed = n, "Workload refresh cycle complete"),
                        Err(e) => tracing::error!(error = %e, "Workload refresh cycle failed"),
                    }
                }
            }
        }
    }
}
