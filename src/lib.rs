//! MetaStream: one query, every configured video site, one response.
//!
//! This crate is the service shell around [`metastream_search`]: TOML
//! configuration, logging setup, and the HTTP endpoint. The aggregation
//! engine itself lives in the `metastream-search` workspace member.

pub mod config;
pub mod error;
pub mod server;

pub use config::MetaStreamConfig;
pub use error::{AppError, Result};
pub use server::SearchServer;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_level` (e.g. `"info"`) is
/// used. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
