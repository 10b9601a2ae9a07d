use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{AlignmentSummary, ChapterRecord, MatchResult};
use crate::matcher::NormalizedPool;

/// Per-chapter match results plus their tier summary.
///
/// `results[i]` always belongs to the i-th edited chapter that was aligned,
/// so callers can zip chapters with results positionally.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// One result per aligned edited chapter, in edited order.
    pub results: Vec<MatchResult>,
    /// Tier counts over `results`.
    pub summary: AlignmentSummary,
}

impl AlignmentReport {
    /// Align `edited` against a prepared pool and append the results.
    pub fn extend(&mut self, edited: &[ChapterRecord], pool: &NormalizedPool<'_>) {
        self.results.reserve(edited.len());
        for record in edited {
            let result = pool.find_best_match(&record.id);
            self.summary.record(result.tier);
            self.results.push(result);
        }
    }

    /// Number of aligned chapters.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns `true` when nothing has been aligned.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Split into the result sequence and its summary.
    pub fn into_parts(self) -> (Vec<MatchResult>, AlignmentSummary) {
        (self.results, self.summary)
    }
}

/// Align every edited chapter against the full raw pool.
///
/// Read-only over both inputs. Cost is O(E × R); see
/// `align_prefiltered` for large pools.
pub fn align(edited: &[ChapterRecord], raw_pool: &[ChapterRecord]) -> AlignmentReport {
    align_with(edited, &NormalizedPool::new(raw_pool))
}

/// Align after narrowing the raw pool to records reachable from `edited`.
///
/// Produces the same report as `align`.
pub fn align_prefiltered(edited: &[ChapterRecord], raw_pool: &[ChapterRecord]) -> AlignmentReport {
    let narrowed = NormalizedPool::narrowed_for(edited, raw_pool);
    debug!(
        pool = raw_pool.len(),
        narrowed = narrowed.len(),
        edited = edited.len(),
        "narrowed raw pool before alignment"
    );
    align_with(edited, &narrowed)
}

/// Align `edited` against an already prepared pool.
pub fn align_with(edited: &[ChapterRecord], pool: &NormalizedPool<'_>) -> AlignmentReport {
    let mut report = AlignmentReport::default();
    report.extend(edited, pool);
    report
}
