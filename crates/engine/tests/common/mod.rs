//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use casework_core::task::TaskType;
use casework_core::types::DbId;
use casework_db::models::lawyer::{CreateLawyer, Lawyer};
use casework_db::models::task::{CreateTask, Task};
use casework_db::repositories::LawyerRepo;
use casework_engine::publishing::Publisher;
use casework_engine::retry::RetryPolicy;
use casework_engine::{Engine, EngineConfig};
use casework_events::EventBus;
use sqlx::PgPool;

/// User id of the operator that publishes fixtures without quota.
pub const OPERATOR_USER_ID: DbId = 1;

pub fn test_config() -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(5),
            multiplier: 2,
        },
        ..EngineConfig::default()
    }
}

pub fn build_engine(pool: &PgPool, config: EngineConfig) -> (Engine, Arc<EventBus>) {
    let events = Arc::new(EventBus::new(256));
    let engine = Engine::new(pool.clone(), config, Arc::clone(&events));
    (engine, events)
}

pub fn operator() -> Publisher {
    Publisher {
        user_id: OPERATOR_USER_ID,
        metered: false,
    }
}

pub fn client(user_id: DbId) -> Publisher {
    Publisher {
        user_id,
        metered: true,
    }
}

pub fn new_task(title: &str) -> CreateTask {
    CreateTask {
        task_type: TaskType::DebtCollection,
        title: title.to_string(),
        description: None,
        target_info: Some(serde_json::json!({"debtor": "Northwind Ltd"})),
        amount_cents: Some(480_000),
        urgency: None,
        region: None,
        required_skills: None,
        source_case_id: None,
        publish: None,
    }
}

pub async fn seed_lawyer(pool: &PgPool, user_id: DbId, daily_claim_limit: Option<i32>) -> Lawyer {
    LawyerRepo::create(
        pool,
        &CreateLawyer {
            user_id,
            display_name: format!("Lawyer {user_id}"),
            specialties: vec![TaskType::DebtCollection.as_str().to_string()],
            regions: vec![],
            max_concurrent_tasks: None,
            daily_claim_limit,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_published_task(engine: &Engine, title: &str) -> Task {
    engine.publisher.create(&new_task(title), operator()).await.unwrap()
}
