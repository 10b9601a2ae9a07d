#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Alignment report aggregation over edited and raw chapter sequences.
pub mod alignment;
/// Story discovery strategies, manifests, and the library index builder.
pub mod catalog;
/// Command-line front end.
pub mod cli;
/// Reader configuration types.
pub mod config;
/// Centralized constants grouped by area.
pub mod constants;
/// Chapter, descriptor, and match result types.
pub mod data;
/// Dataset decoding into chapter records.
pub mod decode;
/// Dataset size classification and descriptions.
pub mod heuristics;
/// Progressive, window-by-window chapter exposure.
pub mod ingestion;
/// Tiered identifier matching.
pub mod matcher;
/// Alignment coverage metrics.
pub mod metrics;
/// Session orchestration with stale-commit protection.
pub mod session;
/// Transports used to check for and fetch library files.
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Identifier normalization and naming helpers.
pub mod utils;

mod errors;

pub use alignment::{AlignmentReport, align, align_prefiltered, align_with};
pub use catalog::{
    Catalog, CatalogResolver, Discovery, DiscoveryStrategy, ManifestDiscovery, ProbeDiscovery,
    StoryManifest, build_manifest, write_manifest,
};
pub use config::{LibraryLayout, LoadPolicy, ReaderConfig, SizeThresholds};
pub use data::{
    AlignmentSummary, ChapterRecord, MatchResult, MatchTier, SizeClass, StoryDescriptor,
};
pub use decode::{DatasetFormat, decode_chapters};
pub use errors::ReaderError;
pub use ingestion::{LoadMode, LoadState, LoadWindow, ProgressiveLoader};
pub use matcher::{NormalizedPool, find_best_match};
pub use session::{PendingComparison, PendingSelection, ReaderSession, SessionToken};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{FsTransport, MemoryTransport, Transport};
pub use types::{ChapterId, DisplayTitle, FileRef, Location, NormalizedId, StrategyName};
pub use utils::normalize_id;
