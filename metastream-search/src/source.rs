//! Trait definition for pluggable result sources.
//!
//! Every site the aggregator can query implements [`Source`]. How a source
//! fetches and parses its data is opaque to the engine; only this contract
//! is visible.

use crate::error::FetchError;
use crate::types::RawItem;
use async_trait::async_trait;

/// A pluggable provider of search results.
///
/// Implementations must be `Send + Sync` because each fetch runs on its own
/// task, concurrently with every other source. A source must not share
/// mutable state with other sources, and must report failure only through
/// the `Err` arm of [`Source::fetch`].
#[async_trait]
pub trait Source: Send + Sync {
    /// Stable, human-readable name. Unique within a registry.
    fn identity(&self) -> &str;

    /// Whether this source takes part in aggregation.
    ///
    /// A registry-level override from configuration takes precedence.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Deterministic locator (usually a URL) the source would query.
    ///
    /// Pure; used for diagnostics and logging only.
    fn query_target(&self, query: &str) -> String;

    /// Fetch results for `query`.
    ///
    /// An empty or malformed query must not panic: return an empty list or
    /// a descriptive [`FetchError`].
    async fn fetch(&self, query: &str) -> Result<Vec<RawItem>, FetchError>;
}
