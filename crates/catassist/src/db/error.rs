//! Error types for the database layer.

use thiserror::Error;

/// Errors that can occur while reading or writing the advising database.
#[derive(Debug, Error)]
pub enum DbError {
    /// SQLite returned an error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the connection panicked
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}
