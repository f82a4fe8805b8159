//! Error types for the metastream-search crate.
//!
//! [`SearchError`] is the only error a caller of the aggregator ever sees.
//! [`FetchError`] is the per-source error channel; it is absorbed by the
//! fetch unit and reported as data in the result envelope.

/// Request-level and construction-time errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was empty or whitespace only. No source was invoked.
    #[error("invalid query: query must not be empty")]
    InvalidQuery,

    /// A source with the same identity is already registered.
    #[error("duplicate source: {0} is already registered")]
    DuplicateSource(String),

    /// Invalid aggregator or source configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Errors a single source reports from [`crate::Source::fetch`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The site answered with a non-success status code.
    #[error("unexpected HTTP status {0}")]
    Status(u16),

    /// The response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response parsed but the data was unusable.
    #[error("malformed data: {0}")]
    MalformedData(String),
}

/// Convenience type alias for metastream-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_query() {
        assert_eq!(
            SearchError::InvalidQuery.to_string(),
            "invalid query: query must not be empty"
        );
    }

    #[test]
    fn display_duplicate_source() {
        let err = SearchError::DuplicateSource("DinoTube".into());
        assert_eq!(
            err.to_string(),
            "duplicate source: DinoTube is already registered"
        );
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("deadline must be greater than 0".into());
        assert_eq!(err.to_string(), "config error: deadline must be greater than 0");
    }

    #[test]
    fn display_fetch_errors() {
        assert_eq!(
            FetchError::Http("connection refused".into()).to_string(),
            "HTTP error: connection refused"
        );
        assert_eq!(FetchError::Status(503).to_string(), "unexpected HTTP status 503");
        assert_eq!(
            FetchError::Parse("bad selector".into()).to_string(),
            "parse error: bad selector"
        );
        assert_eq!(
            FetchError::MalformedData("missing url".into()).to_string(),
            "malformed data: missing url"
        );
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
        assert_send_sync::<FetchError>();
    }
}
