//! Envelope assembly: a pure function of ordered fetch outcomes.

use crate::config::millis;
use crate::types::{FetchOutcome, SearchEnvelope};
use std::time::Duration;

/// Build the result envelope from one outcome per enabled source.
///
/// `outcomes` must be in source-registration order. Items are concatenated
/// in that order, so the result does not depend on which source finished
/// first. A failed source contributes only its name.
pub fn assemble(query: &str, outcomes: Vec<FetchOutcome>, elapsed: Duration) -> SearchEnvelope {
    let scraped_sites = outcomes.len();
    let mut videos = Vec::new();
    let mut failed_sites = Vec::new();
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome {
            FetchOutcome::Success { items, .. } => videos.extend(items),
            FetchOutcome::Failure(failure) => {
                failed_sites.push(failure.source.clone());
                failures.push(failure);
            }
        }
    }

    SearchEnvelope {
        query: query.to_owned(),
        total_results: videos.len(),
        videos,
        scraped_sites,
        failed_sites,
        search_time_ms: millis(elapsed),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::types::{FailureReason, Item, RawItem};
    use chrono::{DateTime, Utc};

    fn stamp() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn success(source: &str, titles: &[&str]) -> FetchOutcome {
        FetchOutcome::Success {
            source: source.to_owned(),
            items: titles
                .iter()
                .map(|t| Item::from_raw(RawItem::new(*t, format!("https://{source}/{t}")), source, stamp()))
                .collect(),
        }
    }

    #[test]
    fn concatenates_in_given_order() {
        let envelope = assemble(
            "x",
            vec![success("A", &["a1", "a2"]), success("B", &["b1"])],
            Duration::from_millis(42),
        );
        let titles: Vec<&str> = envelope.videos.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, ["a1", "a2", "b1"]);
        assert_eq!(envelope.total_results, 3);
        assert_eq!(envelope.scraped_sites, 2);
        assert_eq!(envelope.search_time_ms, 42);
        assert!(envelope.failed_sites.is_empty());
    }

    #[test]
    fn failures_contribute_names_only() {
        let envelope = assemble(
            "x",
            vec![
                success("A", &["a1", "a2"]),
                FetchOutcome::failure("B", FailureReason::Fetch(FetchError::Http("down".into()))),
                success("C", &[]),
            ],
            Duration::ZERO,
        );
        assert_eq!(envelope.total_results, 2);
        assert_eq!(envelope.scraped_sites, 3);
        assert_eq!(envelope.failed_sites, ["B"]);
        assert_eq!(envelope.failures.len(), 1);
        assert_eq!(envelope.failures[0].description(), "HTTP error: down");
        assert!(envelope.videos.iter().all(|v| v.site != "B"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let outcomes = vec![
            success("A", &["a1"]),
            FetchOutcome::failure("B", FailureReason::Timeout),
            success("C", &["c1", "c2"]),
        ];
        let first = assemble("x", outcomes.clone(), Duration::from_millis(5));
        let second = assemble("x", outcomes, Duration::from_millis(5));
        assert_eq!(first, second);
    }

    #[test]
    fn no_outcomes_gives_empty_envelope() {
        let envelope = assemble("x", Vec::new(), Duration::ZERO);
        assert_eq!(envelope, SearchEnvelope::empty("x", 0));
    }
}
