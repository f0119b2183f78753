//! Request extractors for authentication and role checks.
//!
//! - [`auth::AuthUser`] -- any valid bearer token.
//! - [`rbac::RequireAdmin`] -- the `admin` role.
//! - [`rbac::RequireLawyer`] -- `lawyer` or `admin`.

pub mod auth;
pub mod rbac;
