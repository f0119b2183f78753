//! Success envelope shared by all handlers.

use serde::Serialize;

/// `{ "data": T }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
