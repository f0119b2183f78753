//! Well-known role name constants carried in the JWT `role` claim.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_LAWYER: &str = "lawyer";
pub const ROLE_CLIENT: &str = "client";
