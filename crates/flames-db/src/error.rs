use thiserror::Error;

/// Everything a note store operation can fail with.
///
/// `Validation`, `NotFound` and `Unauthorized` are expected outcomes the caller
/// handles; the rest are internal faults.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid note: {0}")]
    Validation(String),

    #[error("note not found")]
    NotFound,

    #[error("password does not match")]
    Unauthorized,

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("no unused note id after {0} attempts")]
    IdSpaceExhausted(u32),
}
