//! Story discovery.
//!
//! Ownership model:
//! - `DiscoveryStrategy` produces descriptors from one kind of source.
//! - `CatalogResolver` tries strategies in order and keeps the first success.
//! - `Catalog` is the wholesale replacement result of one discovery pass.
//!
//! Discovery never fails to the caller: when every strategy fails the catalog
//! is empty and carries a `DiscoveryFailure`.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ReaderConfig;
use crate::data::StoryDescriptor;
use crate::errors::ReaderError;
use crate::transport::Transport;
use crate::types::StrategyName;

/// Library directory scanning and manifest generation.
pub mod index_builder;
/// Manifest schema and manifest-backed discovery.
pub mod manifest;
/// Existence-probe discovery over a fixed candidate list.
pub mod probe;

pub use index_builder::{build_manifest, write_manifest};
pub use manifest::{ManifestDiscovery, ManifestEntry, StoryManifest};
pub use probe::ProbeDiscovery;

/// Descriptors produced by one successful strategy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Discovered stories, in source order.
    pub stories: Vec<StoryDescriptor>,
    /// Whether the source reports any raw counterparts at all.
    pub has_raw_support: bool,
}

/// Pluggable source of story descriptors.
pub trait DiscoveryStrategy: Send + Sync {
    /// Stable strategy name used in logs and catalog provenance.
    fn name(&self) -> &str;
    /// Produce descriptors, or `Err` when this source is unavailable.
    fn discover(&self) -> Result<Discovery, ReaderError>;
}

/// Result of one discovery pass.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Discovered stories; empty when every strategy failed.
    pub stories: Vec<StoryDescriptor>,
    /// Whether any raw counterparts are available.
    pub has_raw_support: bool,
    /// Name of the strategy that produced `stories`.
    pub strategy: Option<StrategyName>,
    /// Reported failure when no strategy succeeded.
    pub error: Option<ReaderError>,
}

impl Catalog {
    /// Descriptor for `file_ref`, if discovered.
    pub fn find(&self, file_ref: &str) -> Option<&StoryDescriptor> {
        self.stories.iter().find(|story| story.file_ref == file_ref)
    }

    /// Number of discovered stories.
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Returns `true` when nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

/// Ordered list of discovery strategies.
#[derive(Default)]
pub struct CatalogResolver {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl CatalogResolver {
    /// Create a resolver with no strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest first, then probing of the configured candidates.
    pub fn for_library(transport: Arc<dyn Transport>, config: &ReaderConfig) -> Self {
        Self::new()
            .with_strategy(ManifestDiscovery::new(
                Arc::clone(&transport),
                config.layout.manifest_location(),
            ))
            .with_strategy(ProbeDiscovery::new(
                transport,
                config.layout.clone(),
                config.probe_candidates.clone(),
            ))
    }

    /// Append a strategy; earlier strategies take precedence.
    pub fn with_strategy(mut self, strategy: impl DiscoveryStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Run strategies in order and return the first successful catalog.
    pub fn discover(&self) -> Catalog {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            match strategy.discover() {
                Ok(discovery) => {
                    info!(
                        "[chapters:catalog] discovered {} stories via {}",
                        discovery.stories.len(),
                        strategy.name()
                    );
                    return Catalog {
                        stories: discovery.stories,
                        has_raw_support: discovery.has_raw_support,
                        strategy: Some(strategy.name().to_string()),
                        error: None,
                    };
                }
                Err(err) => {
                    warn!(
                        "[chapters:catalog] {} discovery unavailable, trying next strategy: {}",
                        strategy.name(),
                        err
                    );
                    failures.push(format!("{}: {}", strategy.name(), err));
                }
            }
        }
        let reason = if failures.is_empty() {
            "no discovery strategies configured".to_string()
        } else {
            failures.join("; ")
        };
        warn!("[chapters:catalog] discovery failed: {}", reason);
        Catalog {
            error: Some(ReaderError::DiscoveryFailure(reason)),
            ..Catalog::default()
        }
    }
}
