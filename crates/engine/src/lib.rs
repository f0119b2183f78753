//! The task claim and document review engine.
//!
//! Services are plain structs holding a pool and shared collaborators; the
//! HTTP layer owns one [`Engine`] behind an `Arc`.

use std::sync::Arc;

use casework_db::DbPool;
use casework_events::EventBus;

pub mod cache;
pub mod config;
pub mod confirmation;
pub mod error;
pub mod publishing;
pub mod quota;
pub mod retry;
pub mod review;
pub mod scheduler;
pub mod workload;

pub use config::EngineConfig;
pub use confirmation::AssignmentConfirmation;
pub use error::{EngineError, EngineResult};
pub use publishing::TaskPublisher;
pub use review::ReviewWorkflow;
pub use scheduler::ClaimScheduler;
pub use workload::WorkloadTracker;

/// All engine services wired to one pool, config and event bus.
pub struct Engine {
    pub config: Arc<EngineConfig>,
    pub workload: Arc<WorkloadTracker>,
    pub scheduler: ClaimScheduler,
    pub confirmation: AssignmentConfirmation,
    pub publisher: TaskPublisher,
    pub reviews: ReviewWorkflow,
}

impl Engine {
    pub fn new(pool: DbPool, config: EngineConfig, events: Arc<EventBus>) -> Self {
        let config = Arc::new(config);
        let workload = Arc::new(WorkloadTracker::new(pool.clone(), Arc::clone(&config)));
        Self {
            scheduler: ClaimScheduler::new(
                pool.clone(),
                Arc::clone(&config),
                Arc::clone(&workload),
                Arc::clone(&events),
            ),
            confirmation: AssignmentConfirmation::new(
                pool.clone(),
                Arc::clone(&config),
                Arc::clone(&workload),
                Arc::clone(&events),
            ),
            publisher: TaskPublisher::new(pool.clone(), Arc::clone(&config), Arc::clone(&events)),
            reviews: ReviewWorkflow::new(pool, Arc::clone(&config), Arc::clone(&workload), events),
            workload,
            config,
        }
    }
}
