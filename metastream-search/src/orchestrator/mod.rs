//! Search orchestrator: fetch units, concurrent fan-out, ordered merge.
//!
//! This module runs one fetch unit per enabled source, waits for all of
//! them or the global deadline, and assembles a single result envelope in
//! source-registration order.

pub mod fetch;
pub mod merge;
pub mod search;
