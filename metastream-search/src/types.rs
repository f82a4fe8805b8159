//! Core types: items, fetch outcomes, and the result envelope.

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One result as a source reports it, before the engine stamps it.
///
/// Sources fill in whatever they can extract; the fetch unit adds the
/// source name and retrieval time to produce an [`Item`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    /// Display string, e.g. `"12:34"`.
    pub duration: String,
    /// Display string, e.g. `"1.2M"`.
    pub views: String,
    /// Display string, e.g. `"3 days ago"`.
    pub upload_date: String,
    pub uploader: String,
    pub description: String,
}

impl RawItem {
    /// Create a raw item with only the two mandatory fields filled in.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

/// A single video result in the aggregated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Name of the source that produced this item.
    pub site: String,
    pub title: String,
    /// Canonical (absolute) URL of the result.
    pub url: String,
    pub thumbnail: String,
    pub duration: String,
    pub views: String,
    pub upload_date: String,
    pub uploader: String,
    pub description: String,
    /// When the engine received this item. Never set by the source.
    pub scraped_at: DateTime<Utc>,
}

impl Item {
    /// Stamp a raw item with its source and retrieval time.
    pub fn from_raw(raw: RawItem, site: &str, scraped_at: DateTime<Utc>) -> Self {
        Self {
            site: site.to_owned(),
            title: raw.title,
            url: raw.url,
            thumbnail: raw.thumbnail,
            duration: raw.duration,
            views: raw.views,
            upload_date: raw.upload_date,
            uploader: raw.uploader,
            description: raw.description,
            scraped_at,
        }
    }
}

/// Why a source contributed no items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The source reported an error through its error channel.
    Fetch(FetchError),
    /// The source did not answer within its per-source timeout.
    Timeout,
    /// The source was still running when the global deadline fired.
    DeadlineExceeded,
    /// The source panicked inside `fetch`.
    Panicked(String),
    /// The source's task was cancelled before it finished (runtime shutdown).
    Cancelled,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Timeout => f.write_str("timeout"),
            Self::DeadlineExceeded => f.write_str("deadline_exceeded"),
            Self::Panicked(msg) => write!(f, "panic: {msg}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A source that failed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub reason: FailureReason,
}

impl SourceFailure {
    /// Human-readable failure description, e.g. `"timeout"`.
    pub fn description(&self) -> String {
        self.reason.to_string()
    }
}

/// Terminal result of one fetch unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success { source: String, items: Vec<Item> },
    Failure(SourceFailure),
}

impl FetchOutcome {
    /// Shorthand for building a failure outcome.
    pub fn failure(source: impl Into<String>, reason: FailureReason) -> Self {
        Self::Failure(SourceFailure {
            source: source.into(),
            reason,
        })
    }

    /// Name of the source this outcome belongs to.
    pub fn source(&self) -> &str {
        match self {
            Self::Success { source, .. } => source,
            Self::Failure(failure) => &failure.source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The aggregated response for one query.
///
/// Field names are part of the external JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEnvelope {
    /// The query as searched (trimmed).
    pub query: String,
    /// Items in source-registration order, source order within a source.
    pub videos: Vec<Item>,
    pub total_results: usize,
    /// Number of enabled sources queried.
    pub scraped_sites: usize,
    /// Names of sources that failed, in registration order.
    pub failed_sites: Vec<String>,
    pub search_time_ms: u64,
    /// Per-source failure detail. Not part of the JSON contract.
    #[serde(skip)]
    pub failures: Vec<SourceFailure>,
}

impl SearchEnvelope {
    /// An envelope for a query that touched no sources.
    pub fn empty(query: impl Into<String>, search_time_ms: u64) -> Self {
        Self {
            query: query.into(),
            videos: Vec::new(),
            total_results: 0,
            scraped_sites: 0,
            failed_sites: Vec::new(),
            search_time_ms,
            failures: Vec::new(),
        }
    }
}
