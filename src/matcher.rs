//! Tiered identifier matching between an edited chapter and a raw pool.
//!
//! Tiers are evaluated in strict confidence order and the first hit wins:
//! - `Exact`: raw id equals the target byte-for-byte.
//! - `Normalized`: `normalize_id` forms are equal.
//! - `Partial`: the normalized raw id starts with the first three tokens of
//!   the normalized target (skipped when the target has fewer tokens).
//!
//! Within a tier the first record in pool order is chosen. That tie-break is
//! kept for compatibility and carries no meaning beyond determinism.

use std::collections::HashSet;

use crate::constants::normalize::{PARTIAL_PREFIX_TOKENS, SEPARATOR};
use crate::data::{ChapterRecord, MatchResult, MatchTier};
use crate::types::NormalizedId;
use crate::utils::normalize_id;

/// Find the best raw match for `target_id` in `pool`.
///
/// Normalizes every pool id on each call; use `NormalizedPool` to match many
/// targets against the same pool.
pub fn find_best_match(target_id: &str, pool: &[ChapterRecord]) -> MatchResult {
    NormalizedPool::new(pool).find_best_match(target_id)
}

/// Prefix used by the partial tier, or `None` when the normalized id has too few tokens.
pub fn partial_prefix(normalized: &str) -> Option<NormalizedId> {
    let tokens: Vec<&str> = normalized.split(SEPARATOR).collect();
    if tokens.len() < PARTIAL_PREFIX_TOKENS {
        return None;
    }
    Some(tokens[..PARTIAL_PREFIX_TOKENS].join("_"))
}

/// Raw pool with each record's normalized id computed once.
pub struct NormalizedPool<'a> {
    entries: Vec<PoolEntry<'a>>,
}

struct PoolEntry<'a> {
    record: &'a ChapterRecord,
    normalized: NormalizedId,
}

impl<'a> NormalizedPool<'a> {
    /// Index every record of `pool`, preserving its order.
    pub fn new(pool: &'a [ChapterRecord]) -> Self {
        Self::from_records(pool.iter())
    }

    /// Index an arbitrary record sequence, preserving iteration order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ChapterRecord>,
    {
        let entries = records
            .into_iter()
            .map(|record| PoolEntry {
                record,
                normalized: normalize_id(&record.id),
            })
            .collect();
        Self { entries }
    }

    /// Keep only pool records that could match at least one of `edited`.
    ///
    /// A record survives when its normalized id equals a normalized edited id
    /// or starts with an edited partial prefix. Every record that could win a
    /// tier for some edited chapter is retained and pool order is preserved,
    /// so matching against the narrowed pool gives identical results.
    pub fn narrowed_for(edited: &[ChapterRecord], pool: &'a [ChapterRecord]) -> Self {
        let mut full_keys: HashSet<NormalizedId> = HashSet::with_capacity(edited.len());
        let mut prefix_keys: HashSet<NormalizedId> = HashSet::new();
        for record in edited {
            let normalized = normalize_id(&record.id);
            if let Some(prefix) = partial_prefix(&normalized) {
                prefix_keys.insert(prefix);
            }
            full_keys.insert(normalized);
        }

        let full = Self::new(pool);
        let entries = full
            .entries
            .into_iter()
            .filter(|entry| {
                full_keys.contains(&entry.normalized)
                    || has_prefix_in(&entry.normalized, &prefix_keys)
            })
            .collect();
        Self { entries }
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the pool holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the best match for `target_id` under the tiered strategy.
    pub fn find_best_match(&self, target_id: &str) -> MatchResult {
        if let Some(entry) = self.entries.iter().find(|entry| entry.record.id == target_id) {
            return self.hit(target_id, entry, MatchTier::Exact);
        }

        let normalized_target = normalize_id(target_id);
        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.normalized == normalized_target)
        {
            return self.hit(target_id, entry, MatchTier::Normalized);
        }

        if let Some(prefix) = partial_prefix(&normalized_target)
            && let Some(entry) = self
                .entries
                .iter()
                .find(|entry| entry.normalized.starts_with(&prefix))
        {
            return self.hit(target_id, entry, MatchTier::Partial);
        }

        MatchResult::unmatched(target_id)
    }

    fn hit(&self, target_id: &str, entry: &PoolEntry<'a>, tier: MatchTier) -> MatchResult {
        MatchResult {
            edited_id: target_id.to_string(),
            raw_record: Some(entry.record.clone()),
            tier,
        }
    }
}

// Checks every char-boundary prefix of `normalized` against the key set.
fn has_prefix_in(normalized: &str, prefixes: &HashSet<NormalizedId>) -> bool {
    if prefixes.is_empty() {
        return false;
    }
    normalized
        .char_indices()
        .map(|(idx, ch)| idx + ch.len_utf8())
        .any(|end| prefixes.contains(&normalized[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> ChapterRecord {
        ChapterRecord::new(id, format!("title {id}"), format!("content {id}"))
    }

    #[test]
    fn exact_beats_earlier_normalized_candidate() {
        let pool = vec![record("chapter_1"), record("Chapter_1")];
        let result = find_best_match("Chapter_1", &pool);
        assert_eq!(result.tier, MatchTier::Exact);
        assert_eq!(result.raw_record.unwrap().id, "Chapter_1");
    }

    #[test]
    fn normalized_tier_matches_spelling_variants() {
        let pool = vec![record("vol1"), record("Volume-1 Chapter-2")];
        let result = find_best_match("volume_1_chapter_2", &pool);
        assert_eq!(result.tier, MatchTier::Normalized);
        assert_eq!(result.raw_record.unwrap().id, "Volume-1 Chapter-2");
    }

    #[test]
    fn partial_tier_uses_three_token_prefix() {
        let pool = vec![record("vol_2_ch_2_part_a"), record("vol_1_ch_2_part_b")];
        let result = find_best_match("vol_1_ch_2_part_a", &pool);
        assert_eq!(result.tier, MatchTier::Partial);
        assert_eq!(result.raw_record.unwrap().id, "vol_1_ch_2_part_b");
    }

    #[test]
    fn partial_tier_is_skipped_for_short_targets() {
        let pool = vec![record("ch_1_extra")];
        let result = find_best_match("ch_1", &pool);
        assert_eq!(result.tier, MatchTier::None);
        assert!(result.raw_record.is_none());
        assert_eq!(result.edited_id, "ch_1");
    }

    #[test]
    fn first_record_in_pool_order_wins_within_a_tier() {
        let pool = vec![record("a_b_c_2"), record("a_b_c_1")];
        let result = find_best_match("a_b_c_9", &pool);
        assert_eq!(result.tier, MatchTier::Partial);
        assert_eq!(result.raw_record.unwrap().id, "a_b_c_2");
    }

    #[test]
    fn partial_prefix_requires_three_tokens() {
        assert_eq!(partial_prefix("ch_1_seg_2"), Some("ch_1_seg".to_string()));
        assert_eq!(partial_prefix("ch_1"), None);
        assert_eq!(partial_prefix(""), None);
    }

    #[test]
    fn narrowed_pool_drops_only_unreachable_records() {
        let edited = vec![record("Chapter_1_Segment_1"), record("School_Day_1")];
        let pool = vec![
            record("unrelated"),
            record("chapter-1-segment-9"),
            record("school day 1"),
            record("ch_2_seg_1"),
        ];
        let narrowed = NormalizedPool::narrowed_for(&edited, &pool);
        assert_eq!(narrowed.len(), 2);
        let full = NormalizedPool::new(&pool);
        for target in &edited {
            assert_eq!(
                narrowed.find_best_match(&target.id),
                full.find_best_match(&target.id)
            );
        }
    }
}
