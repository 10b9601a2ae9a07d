use std::time::Duration;

use crate::constants::catalog::{DEFAULT_PROBE_CANDIDATES, MANIFEST_FILE, RAW_DIR, STORIES_DIR};
use crate::constants::comparison::{PREFILTER_POOL_THRESHOLD, RAW_FETCH_TIMEOUT};
use crate::constants::heuristics::{LARGE_CHAPTER_COUNT, LARGE_FILE_KB};
use crate::constants::loader::DEFAULT_BATCH_SIZE;
use crate::data::SizeClass;
use crate::errors::ReaderError;
use crate::types::{FileRef, Location};

/// Directory layout of a story library, relative to the transport root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LibraryLayout {
    /// Directory containing edited datasets and the manifest.
    pub stories_dir: String,
    /// Directory containing raw counterpart datasets.
    pub raw_dir: String,
    /// Manifest filename inside `stories_dir`.
    pub manifest_file: String,
}

impl Default for LibraryLayout {
    fn default() -> Self {
        Self {
            stories_dir: STORIES_DIR.to_string(),
            raw_dir: RAW_DIR.to_string(),
            manifest_file: MANIFEST_FILE.to_string(),
        }
    }
}

impl LibraryLayout {
    /// Location of an edited dataset.
    pub fn story_location(&self, file_ref: &str) -> Location {
        join_location(&self.stories_dir, file_ref)
    }

    /// Location of a raw counterpart dataset.
    pub fn raw_location(&self, raw_ref: &str) -> Location {
        join_location(&self.raw_dir, raw_ref)
    }

    /// Location of the manifest.
    pub fn manifest_location(&self) -> Location {
        join_location(&self.stories_dir, &self.manifest_file)
    }
}

fn join_location(dir: &str, name: &str) -> Location {
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Decides whether a selected dataset is exposed window-by-window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Window large datasets, expose normal datasets in full.
    #[default]
    Auto,
    /// Always expose datasets window-by-window.
    AlwaysWindowed,
    /// Always expose the full dataset, regardless of size class.
    AlwaysFull,
}

impl LoadPolicy {
    /// Whether a dataset of `size_class` should be windowed under this policy.
    pub fn windows(self, size_class: SizeClass) -> bool {
        match self {
            Self::Auto => size_class == SizeClass::Large,
            Self::AlwaysWindowed => true,
            Self::AlwaysFull => false,
        }
    }
}

/// Thresholds used to classify datasets as large.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeThresholds {
    /// File size, in KiB, above which a dataset is large.
    pub large_file_kb: u64,
    /// Chapter count above which a dataset is large.
    pub large_chapter_count: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            large_file_kb: LARGE_FILE_KB,
            large_chapter_count: LARGE_CHAPTER_COUNT,
        }
    }
}

/// Top-level reader configuration.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Chapters exposed per progressive window step.
    pub batch_size: usize,
    /// Windowing policy applied on dataset selection.
    pub load_policy: LoadPolicy,
    /// Upper bound for fetching and decoding a raw pool.
    pub raw_fetch_timeout: Duration,
    /// Keep the raw pool after a comparison closes so it can be reopened without refetching.
    pub cache_raw_pool: bool,
    /// Raw pools larger than this are narrowed to plausible candidates before aligning.
    pub prefilter_threshold: usize,
    /// Library directory layout.
    pub layout: LibraryLayout,
    /// Dataset names probed when the manifest is unavailable.
    pub probe_candidates: Vec<FileRef>,
    /// Size classification thresholds used by the index builder.
    pub size_thresholds: SizeThresholds,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            load_policy: LoadPolicy::default(),
            raw_fetch_timeout: RAW_FETCH_TIMEOUT,
            cache_raw_pool: true,
            prefilter_threshold: PREFILTER_POOL_THRESHOLD,
            layout: LibraryLayout::default(),
            probe_candidates: DEFAULT_PROBE_CANDIDATES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            size_thresholds: SizeThresholds::default(),
        }
    }
}

impl ReaderConfig {
    /// Reject configurations the loader and comparison paths cannot honor.
    pub fn validate(&self) -> Result<(), ReaderError> {
        if self.batch_size == 0 {
            return Err(ReaderError::Configuration(
                "batch_size must be greater than zero".into(),
            ));
        }
        if self.raw_fetch_timeout.is_zero() {
            return Err(ReaderError::Configuration(
                "raw_fetch_timeout must be greater than zero".into(),
            ));
        }
        if self.layout.manifest_file.trim().is_empty() {
            return Err(ReaderError::Configuration(
                "manifest_file must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_builds_library_locations() {
        let layout = LibraryLayout::default();
        assert_eq!(layout.story_location("a_edit.yaml"), "stories/a_edit.yaml");
        assert_eq!(layout.raw_location("a.yaml"), "raw/a.yaml");
        assert_eq!(layout.manifest_location(), "stories/index.json");

        let flat = LibraryLayout {
            stories_dir: "/".into(),
            ..LibraryLayout::default()
        };
        assert_eq!(flat.story_location("a.yaml"), "a.yaml");
    }

    #[test]
    fn load_policy_treats_size_class_as_advisory() {
        assert!(LoadPolicy::Auto.windows(SizeClass::Large));
        assert!(!LoadPolicy::Auto.windows(SizeClass::Normal));
        assert!(LoadPolicy::AlwaysWindowed.windows(SizeClass::Normal));
        assert!(!LoadPolicy::AlwaysFull.windows(SizeClass::Large));
    }

    #[test]
    fn validate_rejects_zero_batch_and_timeout() {
        assert!(ReaderConfig::default().validate().is_ok());

        let zero_batch = ReaderConfig {
            batch_size: 0,
            ..ReaderConfig::default()
        };
        assert!(matches!(
            zero_batch.validate(),
            Err(ReaderError::Configuration(_))
        ));

        let zero_timeout = ReaderConfig {
            raw_fetch_timeout: Duration::ZERO,
            ..ReaderConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
