use crate::data::{AlignmentSummary, MatchTier};

/// Share of one tier within an alignment summary.
#[derive(Clone, Debug, PartialEq)]
pub struct TierShare {
    /// Tier being measured.
    pub tier: MatchTier,
    /// Chapters that landed in this tier.
    pub count: usize,
    /// Fraction of all aligned chapters.
    pub share: f64,
}

/// Aggregate coverage metrics for an alignment run.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentCoverage {
    /// Aligned edited chapters.
    pub total: usize,
    /// Chapters with any raw match.
    pub matched: usize,
    /// Fraction of chapters with any raw match.
    pub match_rate: f64,
    /// Fraction of chapters matched exactly or after normalization.
    pub confident_rate: f64,
    /// Per-tier shares in confidence order.
    pub per_tier: Vec<TierShare>,
}

/// Compute coverage metrics from a summary; `None` when nothing was aligned.
pub fn alignment_coverage(summary: &AlignmentSummary) -> Option<AlignmentCoverage> {
    let total = summary.total();
    if total == 0 {
        return None;
    }
    let ratio = |count: usize| count as f64 / total as f64;
    let matched = summary.matched();
    let confident = summary.count(MatchTier::Exact) + summary.count(MatchTier::Normalized);
    let per_tier = MatchTier::ALL
        .iter()
        .map(|tier| {
            let count = summary.count(*tier);
            TierShare {
                tier: *tier,
                count,
                share: ratio(count),
            }
        })
        .collect();
    Some(AlignmentCoverage {
        total,
        matched,
        match_rate: ratio(matched),
        confident_rate: ratio(confident),
        per_tier,
    })
}
