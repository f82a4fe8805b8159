//! The set of known sources, built explicitly before any query is served.

use crate::error::SearchError;
use crate::source::Source;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered source: its identity, enabled flag, and implementation.
#[derive(Clone)]
pub struct SourceDescriptor {
    name: String,
    enabled: bool,
    source: Arc<dyn Source>,
}

impl SourceDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of sources.
///
/// Mutation requires `&mut self`; once handed to a
/// [`crate::SearchAggregator`] the registry is shared behind an `Arc` and
/// never changes again.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an enumerated list of sources.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicateSource`] on the first identity collision.
    pub fn from_sources<I>(sources: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = Arc<dyn Source>>,
    {
        let mut registry = Self::new();
        for source in sources {
            registry.register(source)?;
        }
        Ok(registry)
    }

    /// Add a source. Its enabled flag is read once, here.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::DuplicateSource`] if a source with the same
    /// identity is already registered.
    pub fn register(&mut self, source: Arc<dyn Source>) -> Result<(), SearchError> {
        let name = source.identity().to_owned();
        if self.sources.iter().any(|d| d.name == name) {
            return Err(SearchError::DuplicateSource(name));
        }
        let enabled = source.is_enabled();
        tracing::info!(source = %name, enabled, "registered source");
        self.sources.push(SourceDescriptor {
            name,
            enabled,
            source,
        });
        Ok(())
    }

    /// Apply externally supplied enabled flags, keyed by source name.
    ///
    /// Names that match no registered source are ignored with a warning.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, bool>) {
        for (name, &enabled) in overrides {
            match self.sources.iter_mut().find(|d| &d.name == name) {
                Some(descriptor) => {
                    if descriptor.enabled != enabled {
                        tracing::info!(source = %name, enabled, "source enabled flag overridden");
                    }
                    descriptor.enabled = enabled;
                }
                None => {
                    tracing::warn!(source = %name, "override names an unknown source");
                }
            }
        }
    }

    /// All registered sources, in registration order.
    pub fn list_all(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Enabled sources, in registration order.
    pub fn list_enabled(&self) -> Vec<&SourceDescriptor> {
        self.sources.iter().filter(|d| d.enabled).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
