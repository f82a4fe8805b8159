//! Configuration types for the MetaStream service.

use crate::error::{AppError, Result};
use metastream_search::sources::{self, HtmlSource, HtmlSourceSpec};
use metastream_search::{AggregatorConfig, SearchAggregator, Source, SourceRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "METASTREAM_CONFIG";

/// Config file looked up in the working directory when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "metastream.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaStreamConfig {
    /// HTTP listener and logging.
    pub server: ServerConfig,
    /// Aggregation budgets and source toggles.
    pub search: SearchSettings,
    /// Sites to search, in result order.
    pub sources: Vec<HtmlSourceSpec>,
}

impl Default for MetaStreamConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchSettings::default(),
            sources: vec![sources::example_spec()],
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Port to bind. Falls back to an ephemeral port if it is taken.
    pub port: u16,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            log_level: "info".to_owned(),
        }
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Per-source budget in milliseconds.
    pub source_timeout_ms: u64,
    /// Whole-search budget in milliseconds.
    pub deadline_ms: u64,
    /// Fixed User-Agent; rotates through browser UAs when unset.
    pub user_agent: Option<String>,
    /// Enabled flags by source name, overriding each source's own flag.
    pub enabled: HashMap<String, bool>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            source_timeout_ms: 5_000,
            deadline_ms: 10_000,
            user_agent: None,
            enabled: HashMap::new(),
        }
    }
}

impl MetaStreamConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve and load the process configuration.
    ///
    /// Reads the file named by `METASTREAM_CONFIG`, else `./metastream.toml`
    /// if it exists, else defaults. A `PORT` environment variable then
    /// overrides the listener port.
    ///
    /// # Errors
    ///
    /// Returns an error if a named file cannot be loaded or the result is invalid.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_port_override(std::env::var("PORT").ok().as_deref());
        config.validate()?;
        Ok(config)
    }

    /// The config file [`Self::load`] reads, if any.
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Apply a `PORT`-style override. Unparseable values are ignored.
    pub fn apply_port_override(&mut self, port: Option<&str>) {
        let Some(raw) = port else {
            return;
        };
        match raw.trim().parse::<u16>() {
            Ok(port) => self.server.port = port,
            Err(e) => tracing::warn!(value = raw, error = %e, "ignoring invalid PORT"),
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] on zero budgets or duplicate source names.
    pub fn validate(&self) -> Result<()> {
        if self.search.source_timeout_ms == 0 {
            return Err(AppError::Config(
                "search.source_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.search.deadline_ms == 0 {
            return Err(AppError::Config(
                "search.deadline_ms must be greater than 0".into(),
            ));
        }
        for (i, spec) in self.sources.iter().enumerate() {
            if self.sources[..i].iter().any(|s| s.name == spec.name) {
                return Err(AppError::Config(format!(
                    "source {:?} is configured more than once",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Aggregator budgets and toggles derived from `[search]`.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            source_timeout: Duration::from_millis(self.search.source_timeout_ms),
            deadline: Duration::from_millis(self.search.deadline_ms),
            source_overrides: self.search.enabled.clone(),
        }
    }

    /// Build the source registry from `[[sources]]`, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if a source spec is invalid or names collide.
    pub fn build_registry(&self) -> Result<SourceRegistry> {
        let client = metastream_search::http::build_client(
            Duration::from_millis(self.search.source_timeout_ms),
            self.search.user_agent.as_deref(),
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let mut registry = SourceRegistry::new();
        for spec in &self.sources {
            let source = HtmlSource::new(spec.clone(), client.clone())?;
            registry.register(Arc::new(source) as Arc<dyn Source>)?;
        }
        Ok(registry)
    }

    /// Build the registry and wrap it in an aggregator.
    ///
    /// # Errors
    ///
    /// Same as [`Self::build_registry`], plus invalid budgets.
    pub fn build_aggregator(&self) -> Result<SearchAggregator> {
        let registry = self.build_registry()?;
        Ok(SearchAggregator::new(registry, self.aggregator_config())?)
    }
}
