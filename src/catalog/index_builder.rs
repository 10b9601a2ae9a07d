//! Build a library manifest by scanning its directories.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use super::manifest::{ManifestEntry, StoryManifest};
use crate::config::ReaderConfig;
use crate::constants::catalog::{MANIFEST_GENERATOR, MANIFEST_VERSION, RAW_FALLBACK_EXTENSIONS};
use crate::data::SizeClass;
use crate::decode::{DatasetFormat, decode_chapters};
use crate::errors::ReaderError;
use crate::heuristics::{classify_size, describe_story, format_size_kb};
use crate::transport::fs::{file_size, list_dataset_files};
use crate::utils::{default_raw_ref, format_story_title, story_stem};

/// Scan `root` and build a manifest for its stories directory.
///
/// Datasets that fail to decode are still listed, without chapter statistics.
pub fn build_manifest(root: &Path, config: &ReaderConfig) -> Result<StoryManifest, ReaderError> {
    config.validate()?;
    let layout = &config.layout;
    let stories_dir = root.join(&layout.stories_dir);
    let raw_dir = root.join(&layout.raw_dir);

    let mut entries = Vec::new();
    for path in list_dataset_files(&stories_dir) {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if file_name == layout.manifest_file {
            continue;
        }
        entries.push(scan_story(&path, file_name, &raw_dir, config));
    }
    entries.sort_by(|a, b| a.display_title.cmp(&b.display_title));

    let raw_count = list_dataset_files(&raw_dir).len();
    let now = Utc::now();
    let manifest = StoryManifest {
        total_count: Some(entries.len()),
        stories: entries,
        has_raw_support: Some(raw_count > 0),
        raw_count,
        last_updated: Some(now.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        build_date: Some(now.to_rfc3339()),
        version: Some(MANIFEST_VERSION.to_string()),
        generator: Some(MANIFEST_GENERATOR.to_string()),
    };
    info!(
        "[chapters:index] indexed {} stories ({} raw datasets) under {}",
        manifest.stories.len(),
        raw_count,
        stories_dir.display()
    );
    Ok(manifest)
}

/// Build the manifest and write it as pretty JSON into the stories directory.
pub fn write_manifest(root: &Path, config: &ReaderConfig) -> Result<(PathBuf, StoryManifest), ReaderError> {
    let stories_dir = root.join(&config.layout.stories_dir);
    fs::create_dir_all(&stories_dir)?;
    let manifest = build_manifest(root, config)?;
    let json = serde_json::to_string_pretty(&manifest).map_err(|err| {
        ReaderError::Configuration(format!("failed to serialize manifest: {err}"))
    })?;
    let path = stories_dir.join(&config.layout.manifest_file);
    fs::write(&path, json)?;
    info!("[chapters:index] wrote {}", path.display());
    Ok((path, manifest))
}

fn scan_story(path: &Path, file_name: &str, raw_dir: &Path, config: &ReaderConfig) -> ManifestEntry {
    let size_bytes = file_size(path);
    let chapter_count = match fs::read_to_string(path)
        .map_err(ReaderError::from)
        .and_then(|text| decode_chapters(&text, DatasetFormat::from_location(file_name), file_name))
    {
        Ok(records) => Some(records.len()),
        Err(err) => {
            warn!("[chapters:index] listing {} without statistics: {}", file_name, err);
            None
        }
    };
    let raw_file_ref = find_raw_counterpart(raw_dir, file_name);
    let (size_class, description) = match chapter_count {
        Some(count) => {
            let class = classify_size(size_bytes, count, &config.size_thresholds);
            (Some(class), Some(describe_story(count, size_bytes, class)))
        }
        None => (None, None),
    };

    ManifestEntry {
        id: Some(story_stem(file_name)),
        file_ref: file_name.to_string(),
        display_title: Some(format_story_title(file_name)),
        has_raw_counterpart: raw_file_ref.is_some(),
        raw_file_ref,
        chapter_count,
        size: Some(format_size_kb(size_bytes)),
        is_large: size_class == Some(SizeClass::Large),
        size_class,
        description,
    }
}

/// Locate the raw dataset paired with an edited dataset.
///
/// Tried in order: the same name, the name without the edit marker, then the
/// extensionless stem (with and without the marker) under each YAML extension.
pub fn find_raw_counterpart(raw_dir: &Path, file_name: &str) -> Option<String> {
    if !raw_dir.is_dir() {
        return None;
    }
    let mut candidates = vec![file_name.to_string(), default_raw_ref(file_name)];
    let edited_stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    for stem in [edited_stem.to_string(), story_stem(file_name)] {
        for ext in RAW_FALLBACK_EXTENSIONS {
            candidates.push(format!("{stem}.{ext}"));
        }
    }
    candidates
        .into_iter()
        .find(|candidate| raw_dir.join(candidate).is_file())
}
