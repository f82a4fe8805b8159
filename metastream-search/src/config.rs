//! Aggregator configuration with explicit defaults.
//!
//! [`AggregatorConfig`] is handed to [`crate::SearchAggregator::new`]; there
//! are no global toggles.

use crate::error::SearchError;
use std::collections::HashMap;
use std::time::Duration;

/// Default budget for a single source's `fetch`.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default wall-clock budget for a whole aggregated search.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Configuration for the aggregation engine.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// How long one source may take before it is recorded as `timeout`.
    pub source_timeout: Duration,
    /// How long the engine waits across all sources before returning
    /// partial results. Sources still pending are recorded as
    /// `deadline_exceeded`.
    pub deadline: Duration,
    /// Enabled flags by source name, overriding each source's own
    /// [`crate::Source::is_enabled`].
    pub source_overrides: HashMap<String, bool>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
            source_overrides: HashMap::new(),
        }
    }
}

impl AggregatorConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Both durations must be non-zero. A deadline shorter than the per-source
    /// timeout is allowed (the deadline simply wins) but logged.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.source_timeout.is_zero() {
            return Err(SearchError::Config(
                "source_timeout must be greater than 0".into(),
            ));
        }
        if self.deadline.is_zero() {
            return Err(SearchError::Config("deadline must be greater than 0".into()));
        }
        if self.deadline < self.source_timeout {
            tracing::debug!(
                deadline_ms = millis(self.deadline),
                source_timeout_ms = millis(self.source_timeout),
                "global deadline is shorter than the per-source timeout"
            );
        }
        Ok(())
    }
}

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
