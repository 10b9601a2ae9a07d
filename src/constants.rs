/// Constants used by identifier normalization and matching.
pub mod normalize {
    /// Canonical separator emitted by `normalize_id`.
    pub const SEPARATOR: char = '_';
    /// Leading volume token and its canonical replacement.
    pub const VOLUME_TOKEN: &str = "volume";
    /// Replacement emitted for a leading volume token.
    pub const VOLUME_CANONICAL: &str = "vol_";
    /// Chapter token and its canonical replacement.
    pub const CHAPTER_TOKEN: &str = "chapter";
    /// Replacement emitted for every chapter token.
    pub const CHAPTER_CANONICAL: &str = "ch_";
    /// Segment token and its canonical replacement.
    pub const SEGMENT_TOKEN: &str = "segment";
    /// Replacement emitted for every segment token.
    pub const SEGMENT_CANONICAL: &str = "seg_";
    /// Number of leading normalized tokens used by the partial-prefix tier.
    pub const PARTIAL_PREFIX_TOKENS: usize = 3;
}

/// Constants used by the progressive loader.
pub mod loader {
    /// Default number of chapters exposed per window step.
    pub const DEFAULT_BATCH_SIZE: usize = 50;
}

/// Constants used by comparison loading.
pub mod comparison {
    use std::time::Duration;

    /// Upper bound for fetching and decoding a raw pool.
    pub const RAW_FETCH_TIMEOUT: Duration = Duration::from_secs(60);
    /// Pool size above which the session narrows the raw pool before aligning.
    pub const PREFILTER_POOL_THRESHOLD: usize = 2_000;
    /// Thread name used by bounded fetch workers.
    pub const FETCH_WORKER_NAME: &str = "chapters-fetch";
}

/// Constants used by catalog discovery and library layout.
pub mod catalog {
    /// Directory holding edited story datasets and the manifest.
    pub const STORIES_DIR: &str = "stories";
    /// Directory holding raw counterpart datasets.
    pub const RAW_DIR: &str = "raw";
    /// Manifest filename inside the stories directory.
    pub const MANIFEST_FILE: &str = "index.json";
    /// Marker inserted into edited dataset filenames.
    pub const EDIT_MARKER: &str = "_edit";
    /// Dataset file extensions recognized when scanning and titling.
    pub const DATASET_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];
    /// Extensions tried when looking for a raw counterpart by stem.
    pub const RAW_FALLBACK_EXTENSIONS: [&str; 2] = ["yaml", "yml"];
    /// Strategy name reported for manifest-backed discovery.
    pub const MANIFEST_STRATEGY: &str = "manifest";
    /// Strategy name reported for probe-backed discovery.
    pub const PROBE_STRATEGY: &str = "probe";
    /// Manifest schema version written by the index builder.
    pub const MANIFEST_VERSION: &str = "2.0";
    /// Generator tag written by the index builder.
    pub const MANIFEST_GENERATOR: &str = "chapters-index";
    /// Dataset names probed when no manifest is reachable.
    pub const DEFAULT_PROBE_CANDIDATES: [&str; 8] = [
        "boardgame_1_edit.yaml",
        "junna_edit.yaml",
        "junna_1000_1.0_edit.yaml",
        "junna_gmn_edit.yaml",
        "vol1_edit.yaml",
        "vol1_2_edit.yaml",
        "vol_2_gmn_edit.yaml",
        "vol3_4_ds_r1_edit.yaml",
    ];
}

/// Constants used by dataset size classification.
pub mod heuristics {
    /// Files larger than this many KiB are classified as large.
    pub const LARGE_FILE_KB: u64 = 5_000;
    /// Datasets with more chapters than this are classified as large.
    pub const LARGE_CHAPTER_COUNT: usize = 1_000;
    /// Separator used between description fragments.
    pub const DESCRIPTION_SEPARATOR: &str = " • ";
}
