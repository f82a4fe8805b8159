//! Core aggregation engine: concurrent fan-out, global deadline, ordered merge.

use crate::config::{millis, AggregatorConfig};
use crate::error::SearchError;
use crate::registry::SourceRegistry;
use crate::types::{FailureReason, FetchOutcome, SearchEnvelope};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::time::Instant;

use super::fetch::FetchUnit;
use super::merge::assemble;

/// Queries every enabled source concurrently and merges the results.
///
/// Cheap to clone; the registry is shared read-only between clones.
#[derive(Debug, Clone)]
pub struct SearchAggregator {
    registry: Arc<SourceRegistry>,
    config: AggregatorConfig,
}

impl SearchAggregator {
    /// Freeze `registry` and build an aggregator around it.
    ///
    /// Enabled-flag overrides from `config` are applied here, once.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(mut registry: SourceRegistry, config: AggregatorConfig) -> Result<Self, SearchError> {
        config.validate()?;
        registry.apply_overrides(&config.source_overrides);
        Ok(Self {
            registry: Arc::new(registry),
            config,
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Search all enabled sources for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Reject an empty or whitespace-only query
    /// 2. Snapshot the enabled sources; none enabled yields an empty envelope
    /// 3. Spawn one [`FetchUnit`] per source, all concurrently
    /// 4. Collect outcomes until every unit is done or the global deadline
    ///    fires; units still pending become `deadline_exceeded` failures and
    ///    their tasks are aborted
    /// 5. Merge in registration order and stamp the elapsed time
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for a blank query. Source
    /// failures never surface as errors; they are listed in
    /// [`SearchEnvelope::failed_sites`].
    pub async fn search(&self, query: &str) -> Result<SearchEnvelope, SearchError> {
        let started = Instant::now();

        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let enabled = self.registry.list_enabled();
        if enabled.is_empty() {
            tracing::warn!("no sources enabled, returning empty results");
            return Ok(assemble(query, Vec::new(), started.elapsed()));
        }

        tracing::debug!(query, sources = enabled.len(), "starting aggregated search");

        // 1. Fan out, tagging each unit with its registration index.
        let shared_query: Arc<str> = Arc::from(query);
        let mut pending: FuturesUnordered<_> = enabled
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                let unit = FetchUnit::new(descriptor, self.config.source_timeout);
                let q = Arc::clone(&shared_query);
                async move { (index, unit.run(q).await) }
            })
            .collect();

        // 2. Fan in until done or the deadline fires.
        let mut slots: Vec<Option<FetchOutcome>> =
            std::iter::repeat_with(|| None).take(enabled.len()).collect();
        // A deadline past the clock's range never fires.
        let expiry = async {
            match started.checked_add(self.config.deadline) {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;
                next = pending.next() => match next {
                    Some((index, outcome)) => {
                        tracing::debug!(
                            source = outcome.source(),
                            ok = outcome.is_success(),
                            remaining = pending.len(),
                            "source finished"
                        );
                        slots[index] = Some(outcome);
                    }
                    None => break,
                },
                () = &mut expiry => {
                    tracing::warn!(
                        pending = pending.len(),
                        deadline_ms = millis(self.config.deadline),
                        "global deadline reached, abandoning pending sources"
                    );
                    break;
                }
            }
        }

        // Dropping the remaining units aborts their tasks.
        drop(pending);

        // 3. Fill abandoned slots and merge in registration order.
        let outcomes: Vec<FetchOutcome> = slots
            .into_iter()
            .zip(&enabled)
            .map(|(slot, descriptor)| {
                slot.unwrap_or_else(|| {
                    FetchOutcome::failure(descriptor.name(), FailureReason::DeadlineExceeded)
                })
            })
            .collect();

        let envelope = assemble(query, outcomes, started.elapsed());
        tracing::info!(
            total = envelope.total_results,
            sources = envelope.scraped_sites,
            failed = envelope.failed_sites.len(),
            elapsed_ms = envelope.search_time_ms,
            "search completed"
        );
        Ok(envelope)
    }
}
