use thiserror::Error;

/// Why a single row was rejected. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Invalid email address: {0}")]
    Format(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("Contact with this email already exists")]
    Conflict,

    /// The store failed for a reason not caught by validation. The cause is
    /// logged, never surfaced to the caller.
    #[error("Failed to save contact")]
    Persistence,
}

/// Input that cannot be turned into rows at all. Aborts before any row runs.
#[derive(Debug, Error)]
pub enum RowSourceError {
    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's own uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("contact store unavailable: {0}")]
    Backend(String),
}
