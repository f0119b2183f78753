use casework_core::error::CoreError;

/// Error type returned by every engine operation.
///
/// Domain outcomes (unavailable task, exhausted quota, illegal transition)
/// travel as [`CoreError`]; only store failures are `Database`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Whether retrying the whole operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(e) => crate::retry::is_transient(e),
            Self::Core(_) => false,
        }
    }
}
