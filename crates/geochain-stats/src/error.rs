//! Error types for the stats layer.

/// Errors that can occur while recording or persisting statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Reading or writing the backing file failed.
    #[error("stats file i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a valid stats document.
    #[error("stats file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("stats store lock poisoned")]
    Poisoned,
}
