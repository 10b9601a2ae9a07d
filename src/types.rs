/// Chapter identifier as written in a dataset.
/// Examples: `Chapter_1_Segment_2`, `vol1_chapter_3`, `School_Day_1`
pub type ChapterId = String;
/// Identifier after `normalize_id` canonicalization.
/// Examples: `ch_1_seg_2`, `vol_1_ch_3`
pub type NormalizedId = String;
/// Opaque handle to a dataset inside a library (file name or URL path).
/// Examples: `boardgame_1_edit.yaml`, `vol1_2_edit.yaml`
pub type FileRef = String;
/// Transport-relative location of a dataset or manifest.
/// Examples: `stories/junna_edit.yaml`, `raw/junna.yaml`, `stories/index.json`
pub type Location = String;
/// Human-facing story title.
/// Examples: `Boardgame 1`, `Vol1 2`
pub type DisplayTitle = String;
/// Name of a discovery strategy, used in logs and catalog provenance.
/// Examples: `manifest`, `probe`
pub type StrategyName = String;
