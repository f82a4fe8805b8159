//! Error types for the MetaStream service.

/// Top-level error type for the search service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration file or value error.
    #[error("config error: {0}")]
    Config(String),

    /// Search core construction error (duplicate source, bad selector, ...).
    #[error("search error: {0}")]
    Search(#[from] metastream_search::SearchError),

    /// HTTP server error (bind, serve).
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, AppError>;
