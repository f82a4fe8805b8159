//! Fetch unit: one source invocation with a timeout and panic isolation.
//!
//! The source's `fetch` runs on its own spawned task. A panic inside it
//! surfaces as a [`tokio::task::JoinError`] instead of unwinding into the
//! engine, and dropping the unit (timeout or global deadline) aborts the
//! task through [`AbortOnDropHandle`].

use crate::config::millis;
use crate::registry::SourceDescriptor;
use crate::source::Source;
use crate::types::{FailureReason, FetchOutcome, Item};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::task::AbortOnDropHandle;

/// A single pending invocation of one source.
pub struct FetchUnit {
    name: String,
    source: Arc<dyn Source>,
    timeout: Duration,
}

impl FetchUnit {
    pub fn new(descriptor: &SourceDescriptor, timeout: Duration) -> Self {
        Self {
            name: descriptor.name().to_owned(),
            source: Arc::clone(descriptor.source()),
            timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the source and produce exactly one outcome.
    ///
    /// Never panics and never returns early without an outcome. Items are
    /// stamped with the source name and the time the unit received them.
    pub async fn run(self, query: Arc<str>) -> FetchOutcome {
        let Self {
            name,
            source,
            timeout,
        } = self;

        tracing::trace!(
            source = %name,
            target = %source.query_target(&query),
            "fetch unit started"
        );

        let task = AbortOnDropHandle::new(tokio::spawn(async move { source.fetch(&query).await }));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(Ok(raw_items))) => {
                let scraped_at = chrono::Utc::now();
                let items: Vec<Item> = raw_items
                    .into_iter()
                    .map(|raw| Item::from_raw(raw, &name, scraped_at))
                    .collect();
                tracing::debug!(source = %name, count = items.len(), "source returned results");
                FetchOutcome::Success {
                    source: name,
                    items,
                }
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(source = %name, error = %err, "source fetch failed");
                FetchOutcome::failure(name, FailureReason::Fetch(err))
            }
            Ok(Err(join_err)) if join_err.is_panic() => {
                let message = panic_message(join_err.into_panic());
                tracing::error!(source = %name, panic = %message, "source panicked during fetch");
                FetchOutcome::failure(name, FailureReason::Panicked(message))
            }
            Ok(Err(_)) => {
                tracing::warn!(source = %name, "source task cancelled");
                FetchOutcome::failure(name, FailureReason::Cancelled)
            }
            Err(_) => {
                tracing::warn!(
                    source = %name,
                    timeout_ms = millis(timeout),
                    "source timed out"
                );
                FetchOutcome::failure(name, FailureReason::Timeout)
            }
        }
    }
}

/// Extract a printable message from a panic payload.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
