//! # metastream-search
//!
//! Aggregated video search across independent, pluggable sources.
//!
//! Every source implements the [`Source`] contract and is registered once,
//! explicitly, in a [`SourceRegistry`]. A [`SearchAggregator`] fans a query
//! out to all enabled sources concurrently and returns one
//! [`SearchEnvelope`].
//!
//! ## Design
//!
//! - One task per enabled source; total latency is bounded by the slowest
//!   source, the per-source timeout, and the global deadline
//! - A failing, slow, or panicking source is recorded in `failed_sites` and
//!   never fails the whole search
//! - Items are merged in source-registration order, so output does not
//!   depend on network timing
//! - The only request-level error is an empty query
//!
//! ## Non-goals
//!
//! No caching, no cross-source deduplication, no relevance ranking.

pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod registry;
pub mod source;
pub mod sources;
pub mod types;

pub use config::AggregatorConfig;
pub use error::{FetchError, Result, SearchError};
pub use orchestrator::search::SearchAggregator;
pub use registry::{SourceDescriptor, SourceRegistry};
pub use source::Source;
pub use types::{FailureReason, FetchOutcome, Item, RawItem, SearchEnvelope, SourceFailure};

/// Search all enabled sources in `registry` with default budgets.
///
/// Convenience wrapper for one-off searches; long-running callers should
/// build a [`SearchAggregator`] once and reuse it.
///
/// # Errors
///
/// Returns [`SearchError::InvalidQuery`] for a blank query.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> metastream_search::Result<()> {
/// use metastream_search::{sources, SourceRegistry};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let client = metastream_search::http::build_client(Duration::from_secs(5), None)
///     .map_err(|e| metastream_search::SearchError::Config(e.to_string()))?;
/// let mut spec = sources::example_spec();
/// spec.enabled = true;
/// let registry = SourceRegistry::from_sources([
///     Arc::new(sources::HtmlSource::new(spec, client)?) as Arc<dyn metastream_search::Source>,
/// ])?;
/// let envelope = metastream_search::search_once(registry, "sunset").await?;
/// for video in &envelope.videos {
///     println!("{} [{}]: {}", video.title, video.site, video.url);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search_once(registry: SourceRegistry, query: &str) -> Result<SearchEnvelope> {
    SearchAggregator::new(registry, AggregatorConfig::default())?
        .search(query)
        .await
}
