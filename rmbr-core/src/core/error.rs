//! Error types for the rmbr core library.

use thiserror::Error;

/// All errors that can occur within the rmbr core library.
///
/// Store mutations never produce these; a mutation addressing an unknown id
/// reports [`Outcome::Ignored`](crate::Outcome::Ignored) instead. Errors only
/// arise at the persistence and configuration boundary.
#[derive(Debug, Error)]
pub enum RmbrError {
    /// A SQLite operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot or settings document could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The opened file or stored value is not a valid rmbr snapshot store.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A stored snapshot was written by an incompatible schema version.
    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },
}

/// Convenience alias that pins the error type to [`RmbrError`].
pub type Result<T> = std::result::Result<T, RmbrError>;

impl RmbrError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(e) => format!("Failed to save: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
            Self::InvalidSnapshot(_) => "Could not read saved workspace".to_string(),
            Self::UnsupportedSnapshotVersion { .. } => {
                "Saved workspace was written by an incompatible version of rmbr".to_string()
            }
        }
    }
}
