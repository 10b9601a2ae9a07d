use std::fs;
use std::sync::Arc;

use tempfile::tempdir;

use chapters::catalog::{CatalogResolver, write_manifest};
use chapters::config::ReaderConfig;
use chapters::data::SizeClass;
use chapters::transport::{FsTransport, MemoryTransport};
use chapters::ReaderError;

fn config_with_candidates(candidates: &[&str]) -> ReaderConfig {
    ReaderConfig {
        probe_candidates: candidates.iter().map(|name| name.to_string()).collect(),
        ..ReaderConfig::default()
    }
}

#[test]
fn manifest_without_raw_support_yields_plain_descriptors() {
    let manifest = r#"{"stories":[{"fileRef":"a.dat","displayTitle":"A"}],"has_raw_support":false}"#;
    let transport = Arc::new(MemoryTransport::new().with_file("stories/index.json", manifest));
    let catalog = CatalogResolver::for_library(transport, &ReaderConfig::default()).discover();

    assert_eq!(catalog.strategy.as_deref(), Some("manifest"));
    assert!(catalog.error.is_none());
    assert!(!catalog.has_raw_support);
    assert_eq!(catalog.len(), 1);
    let story = &catalog.stories[0];
    assert_eq!(story.file_ref, "a.dat");
    assert_eq!(story.display_title, "A");
    assert!(!story.has_raw_counterpart);
}

#[test]
fn malformed_manifest_falls_back_to_probing() {
    let transport = MemoryTransport::new()
        .with_file("stories/index.json", "<html>not found</html>")
        .with_file("stories/first_story_edit.yaml", "[]")
        .with_file("stories/third.yml", "[]");
    let transport = Arc::new(transport);
    let config = config_with_candidates(&["first_story_edit.yaml", "second.yaml", "third.yml"]);
    let catalog = CatalogResolver::for_library(transport.clone(), &config).discover();

    assert_eq!(catalog.strategy.as_deref(), Some("probe"));
    assert!(catalog.error.is_none());
    let titles: Vec<_> = catalog.stories.iter().map(|s| s.display_title.as_str()).collect();
    assert_eq!(titles, vec!["First Story", "Third"]);
    assert!(catalog.stories.iter().all(|s| !s.has_raw_counterpart));
    assert!(catalog.stories.iter().all(|s| s.size_class == SizeClass::Normal));
    assert_eq!(transport.check_count(), 3);
}

#[test]
fn unreachable_library_yields_empty_catalog_with_failure() {
    let transport = MemoryTransport::new()
        .with_failure("stories/index.json", "connection refused")
        .with_failure("stories/a.yaml", "connection refused")
        .with_failure("stories/b.yaml", "connection refused");
    let config = config_with_candidates(&["a.yaml", "b.yaml"]);
    let catalog = CatalogResolver::for_library(Arc::new(transport), &config).discover();

    assert!(catalog.is_empty());
    assert!(catalog.strategy.is_none());
    match catalog.error {
        Some(ReaderError::DiscoveryFailure(reason)) => {
            assert!(reason.contains("manifest"));
            assert!(reason.contains("probe"));
        }
        other => panic!("expected DiscoveryFailure, got {other:?}"),
    }
}

#[test]
fn indexed_directory_is_discovered_through_its_manifest() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("stories")).unwrap();
    fs::create_dir_all(root.join("raw")).unwrap();
    let chapters: String = (1..=3)
        .map(|n| format!("- id: ch_{n}\n  title: Chapter {n}\n  content: text {n}\n"))
        .collect();
    fs::write(root.join("stories/moon_river_edit.yaml"), &chapters).unwrap();
    fs::write(root.join("stories/lonely.yaml"), &chapters).unwrap();
    fs::write(root.join("raw/moon_river.yaml"), &chapters).unwrap();

    let config = ReaderConfig::default();
    let (path, manifest) = write_manifest(root, &config).unwrap();
    assert!(path.ends_with("stories/index.json"));
    assert_eq!(manifest.raw_count, 1);
    assert!(manifest.build_date.is_some());

    let transport = Arc::new(FsTransport::new(root));
    let catalog = CatalogResolver::for_library(transport, &config).discover();
    assert_eq!(catalog.strategy.as_deref(), Some("manifest"));
    assert!(catalog.has_raw_support);
    let titles: Vec<_> = catalog.stories.iter().map(|s| s.display_title.as_str()).collect();
    assert_eq!(titles, vec!["Lonely", "Moon River"]);

    let moon = catalog.find("moon_river_edit.yaml").unwrap();
    assert!(moon.has_raw_counterpart);
    assert_eq!(moon.raw_file_ref.as_deref(), Some("moon_river.yaml"));
    assert_eq!(moon.chapter_count, Some(3));
    assert!(moon.description.as_deref().unwrap().starts_with("3 chapters"));
    assert!(!catalog.find("lonely.yaml").unwrap().has_raw_counterpart);
}

#[test]
fn directory_without_manifest_is_probed() {
    let temp = tempdir().unwrap();
    fs::create_dir_all(temp.path().join("stories")).unwrap();
    fs::write(temp.path().join("stories/b.yaml"), "[]").unwrap();

    let config = config_with_candidates(&["a.yaml", "b.yaml"]);
    let catalog =
        CatalogResolver::for_library(Arc::new(FsTransport::new(temp.path())), &config).discover();
    assert_eq!(catalog.strategy.as_deref(), Some("probe"));
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.stories[0].file_ref, "b.yaml");
}
