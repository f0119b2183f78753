//! Bearer-token validation. Tokens are issued by the platform's identity
//! service; this crate only verifies them.

pub mod jwt;
