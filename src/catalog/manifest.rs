use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Discovery, DiscoveryStrategy};
use crate::constants::catalog::MANIFEST_STRATEGY;
use crate::data::{SizeClass, StoryDescriptor};
use crate::errors::ReaderError;
use crate::transport::Transport;
use crate::types::{FileRef, Location};
use crate::utils::{default_raw_ref, format_story_title};

/// Manifest document listing the stories of a library.
///
/// Every field except `stories` is informational; missing fields fall back to
/// defaults so that hand-written manifests stay loadable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryManifest {
    /// Story entries in listing order.
    #[serde(default)]
    pub stories: Vec<ManifestEntry>,
    /// Whether the library ships raw counterparts; `None` means unknown.
    #[serde(default, alias = "has_raw_support", skip_serializing_if = "Option::is_none")]
    pub has_raw_support: Option<bool>,
    /// Number of raw datasets present when the manifest was built.
    #[serde(default, alias = "raw_count")]
    pub raw_count: usize,
    /// Number of story entries when the manifest was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    /// Human-readable build timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// RFC 3339 build timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    /// Manifest schema version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Tool that produced the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// One story entry of a manifest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Stable story id, usually the dataset stem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Edited dataset handle.
    #[serde(default, alias = "fileName")]
    pub file_ref: FileRef,
    /// Title shown to readers; synthesized from `file_ref` when absent.
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
    /// Whether a raw counterpart exists.
    #[serde(default, alias = "hasRaw")]
    pub has_raw_counterpart: bool,
    /// Raw dataset handle.
    #[serde(default, alias = "rawFileName", skip_serializing_if = "Option::is_none")]
    pub raw_file_ref: Option<FileRef>,
    /// Number of chapters in the edited dataset.
    #[serde(default, alias = "chapters", skip_serializing_if = "Option::is_none")]
    pub chapter_count: Option<usize>,
    /// Formatted dataset size, e.g. `1,234KB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Legacy large-file flag, used when `size_class` is absent.
    #[serde(default)]
    pub is_large: bool,
    /// Advisory size class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_class: Option<SizeClass>,
    /// Human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ManifestEntry {
    /// Convert to a descriptor; `None` for entries without a file handle.
    ///
    /// `library_has_raw` gates the per-entry raw flag: a library that reports
    /// no raw support never yields comparable stories.
    pub fn to_descriptor(&self, library_has_raw: bool) -> Option<StoryDescriptor> {
        let file_ref = self.file_ref.trim();
        if file_ref.is_empty() {
            return None;
        }
        let display_title = self
            .display_title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format_story_title(file_ref));
        let has_raw_counterpart = self.has_raw_counterpart && library_has_raw;
        let raw_file_ref = has_raw_counterpart.then(|| {
            self.raw_file_ref
                .clone()
                .filter(|raw| !raw.trim().is_empty())
                .unwrap_or_else(|| default_raw_ref(file_ref))
        });
        let size_class = self.size_class.unwrap_or(if self.is_large {
            SizeClass::Large
        } else {
            SizeClass::Normal
        });
        Some(StoryDescriptor {
            file_ref: file_ref.to_string(),
            display_title,
            has_raw_counterpart,
            size_class,
            description: self.description.clone(),
            raw_file_ref,
            chapter_count: self.chapter_count,
        })
    }
}

impl StoryManifest {
    /// Parse manifest JSON.
    pub fn parse(text: &str, display_name: &str) -> Result<Self, ReaderError> {
        serde_json::from_str(text).map_err(|err| ReaderError::DecodeFailure {
            display_name: display_name.to_string(),
            details: format!("invalid manifest: {err}"),
        })
    }

    /// Descriptors for every usable entry, in manifest order.
    pub fn descriptors(&self) -> Vec<StoryDescriptor> {
        let library_has_raw = self.has_raw_support.unwrap_or(true);
        self.stories
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let descriptor = entry.to_descriptor(library_has_raw);
                if descriptor.is_none() {
                    warn!(
                        "[chapters:manifest] skipping entry #{} without a file reference",
                        index
                    );
                }
                descriptor
            })
            .collect()
    }
}

/// Discovery backed by a single manifest fetch.
pub struct ManifestDiscovery {
    transport: Arc<dyn Transport>,
    location: Location,
}

impl ManifestDiscovery {
    /// Read the manifest at `location` through `transport`.
    pub fn new(transport: Arc<dyn Transport>, location: impl Into<Location>) -> Self {
        Self {
            transport,
            location: location.into(),
        }
    }

    /// Manifest location this strategy reads.
    pub fn location(&self) -> &str {
        &self.location
    }
}

impl DiscoveryStrategy for ManifestDiscovery {
    fn name(&self) -> &str {
        MANIFEST_STRATEGY
    }

    fn discover(&self) -> Result<Discovery, ReaderError> {
        let text = self.transport.fetch_text(&self.location)?;
        let manifest = StoryManifest::parse(&text, &self.location)?;
        let stories = manifest.descriptors();
        let has_raw_support = manifest
            .has_raw_support
            .unwrap_or_else(|| stories.iter().any(|story| story.has_raw_counterpart));
        debug!(
            location = %self.location,
            entries = manifest.stories.len(),
            usable = stories.len(),
            has_raw_support,
            "manifest parsed"
        );
        Ok(Discovery {
            stories,
            has_raw_support,
        })
    }
}
