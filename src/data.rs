use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use crate::types::{ChapterId, DisplayTitle, FileRef};

/// One titled unit of story content.
///
/// Records are immutable once decoded; `id` is non-empty and unique within a
/// dataset by convention only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    /// Chapter identifier as written in the dataset.
    pub id: ChapterId,
    /// Chapter title.
    pub title: String,
    /// Chapter body text.
    pub content: String,
}

impl ChapterRecord {
    /// Build a record from its three fields.
    pub fn new(id: impl Into<ChapterId>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Advisory dataset size classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// Small enough to expose in full.
    #[default]
    Normal,
    /// Exposed window-by-window under the default policy.
    Large,
}

/// Catalog entry describing one available story dataset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDescriptor {
    /// Opaque handle to the edited dataset.
    pub file_ref: FileRef,
    /// Title shown to readers.
    pub display_title: DisplayTitle,
    /// Whether a raw dataset exists for side-by-side comparison.
    pub has_raw_counterpart: bool,
    /// Advisory size class used to pick a load mode.
    pub size_class: SizeClass,
    /// Optional human-readable summary.
    pub description: Option<String>,
    /// Handle of the raw dataset, when known.
    pub raw_file_ref: Option<FileRef>,
    /// Chapter count, when the discovery source reports it.
    pub chapter_count: Option<usize>,
}

/// Confidence level of an identifier match.
///
/// Variants are declared from lowest to highest confidence so the derived
/// ordering reads `Exact > Normalized > Partial > None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    /// No raw candidate.
    None,
    /// Raw id starts with the first three normalized tokens.
    Partial,
    /// Identical after normalization.
    Normalized,
    /// Identical identifier.
    Exact,
}

impl MatchTier {
    /// All tiers from highest to lowest confidence.
    pub const ALL: [MatchTier; 4] = [
        MatchTier::Exact,
        MatchTier::Normalized,
        MatchTier::Partial,
        MatchTier::None,
    ];

    /// Lower-case label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normalized => "normalized",
            Self::Partial => "partial",
            Self::None => "none",
        }
    }
}

/// Per-chapter alignment outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Identifier of the edited chapter that was matched.
    pub edited_id: ChapterId,
    /// Matched raw chapter, absent for `MatchTier::None`.
    pub raw_record: Option<ChapterRecord>,
    /// Confidence tier of the match.
    pub tier: MatchTier,
}

impl MatchResult {
    /// Result for a chapter with no qualifying raw record.
    pub fn unmatched(edited_id: impl Into<ChapterId>) -> Self {
        Self {
            edited_id: edited_id.into(),
            raw_record: None,
            tier: MatchTier::None,
        }
    }

    /// True when a raw record was found.
    pub fn is_matched(&self) -> bool {
        self.raw_record.is_some()
    }
}

/// Tier counts over one alignment run.
///
/// Every tier is always present in `counts`, and the counts sum to `total`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    counts: IndexMap<MatchTier, usize>,
    total: usize,
}

impl Default for AlignmentSummary {
    fn default() -> Self {
        Self {
            counts: MatchTier::ALL.iter().map(|tier| (*tier, 0)).collect(),
            total: 0,
        }
    }
}

impl AlignmentSummary {
    /// Tally one result tier.
    pub fn record(&mut self, tier: MatchTier) {
        *self.counts.entry(tier).or_insert(0) += 1;
        self.total += 1;
    }

    /// Count for a single tier.
    pub fn count(&self, tier: MatchTier) -> usize {
        self.counts.get(&tier).copied().unwrap_or(0)
    }

    /// Number of results tallied.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of results with any raw record.
    pub fn matched(&self) -> usize {
        self.counts
            .iter()
            .filter(|(tier, _)| **tier != MatchTier::None)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Tier counts in confidence order.
    pub fn counts(&self) -> &IndexMap<MatchTier, usize> {
        &self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_order_by_confidence() {
        assert!(MatchTier::Exact > MatchTier::Normalized);
        assert!(MatchTier::Normalized > MatchTier::Partial);
        assert!(MatchTier::Partial > MatchTier::None);
        let mut sorted = MatchTier::ALL.to_vec();
        sorted.sort();
        sorted.reverse();
        assert_eq!(sorted, MatchTier::ALL.to_vec());
    }

    #[test]
    fn summary_starts_with_every_tier_at_zero() {
        let summary = AlignmentSummary::default();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.counts().len(), 4);
        assert!(summary.counts().values().all(|count| *count == 0));
        let order: Vec<MatchTier> = summary.counts().keys().copied().collect();
        assert_eq!(order, MatchTier::ALL.to_vec());
    }

    #[test]
    fn summary_counts_sum_to_total() {
        let mut summary = AlignmentSummary::default();
        for tier in [MatchTier::Exact, MatchTier::None, MatchTier::Exact, MatchTier::Partial] {
            summary.record(tier);
        }
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.count(MatchTier::Exact), 2);
        assert_eq!(summary.matched(), 3);
        assert_eq!(summary.counts().values().sum::<usize>(), summary.total());
    }

    #[test]
    fn matched_ignores_an_inconsistent_total() {
        let summary: AlignmentSummary =
            serde_json::from_str(r#"{"counts": {"exact": 1, "partial": 2, "none": 5}, "total": 3}"#)
                .unwrap();
        assert_eq!(summary.matched(), 3);
        assert_eq!(summary.count(MatchTier::Normalized), 0);
    }

    #[test]
    fn tiers_serialize_lowercase() {
        let json = serde_json::to_string(&MatchTier::Normalized).unwrap();
        assert_eq!(json, "\"normalized\"");
        let class: SizeClass = serde_json::from_str("\"large\"").unwrap();
        assert_eq!(class, SizeClass::Large);
    }
}
