//! HTTP surface of the casework engine.
//!
//! Library half of the `casework-api` binary so integration tests can build
//! the same router and state the server runs with.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
