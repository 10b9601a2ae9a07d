//! Identifier and title normalization helpers.

use crate::constants::catalog::{DATASET_EXTENSIONS, EDIT_MARKER};
use crate::constants::normalize::{
    CHAPTER_CANONICAL, CHAPTER_TOKEN, SEGMENT_CANONICAL, SEGMENT_TOKEN, SEPARATOR,
    VOLUME_CANONICAL, VOLUME_TOKEN,
};
use crate::types::{DisplayTitle, NormalizedId};

/// Canonicalize a chapter identifier into a comparable normal form.
///
/// Lower-cases, collapses `_`/`-`/whitespace runs into a single `_`, rewrites a
/// leading `volume` token to `vol_`, every `chapter` to `ch_` and every
/// `segment` to `seg_`, then trims separators from both ends. Total and
/// idempotent; the empty string normalizes to itself.
pub fn normalize_id<T: AsRef<str>>(id: T) -> NormalizedId {
    let lowered = id.as_ref().to_lowercase();
    let collapsed = collapse_separators(&lowered);
    let with_volume = canonicalize_leading_volume(&collapsed);
    let with_chapter = replace_token(&with_volume, CHAPTER_TOKEN, CHAPTER_CANONICAL);
    let with_segment = replace_token(&with_chapter, SEGMENT_TOKEN, SEGMENT_CANONICAL);
    with_segment.trim_matches(SEPARATOR).to_string()
}

fn is_separator(ch: char) -> bool {
    ch == '_' || ch == '-' || ch.is_whitespace()
}

fn collapse_separators(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if is_separator(ch) {
            if !in_run {
                collapsed.push(SEPARATOR);
                in_run = true;
            }
        } else {
            collapsed.push(ch);
            in_run = false;
        }
    }
    collapsed
}

// Leading separators are ignored so the rewrite agrees with the final trim.
fn canonicalize_leading_volume(text: &str) -> String {
    let body = text.trim_start_matches(SEPARATOR);
    match body.strip_prefix(VOLUME_TOKEN) {
        Some(rest) => {
            let rest = rest.strip_prefix(SEPARATOR).unwrap_or(rest);
            format!("{VOLUME_CANONICAL}{rest}")
        }
        None => text.to_string(),
    }
}

fn replace_token(text: &str, token: &str, canonical: &str) -> String {
    let mut replaced = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(token) {
        replaced.push_str(&rest[..pos]);
        replaced.push_str(canonical);
        rest = &rest[pos + token.len()..];
        rest = rest.strip_prefix(SEPARATOR).unwrap_or(rest);
    }
    replaced.push_str(rest);
    replaced
}

/// Strip a dataset extension and the edit marker from a file reference.
///
/// `junna_gmn_edit.yaml` becomes `junna_gmn`.
pub fn story_stem(file_ref: &str) -> String {
    let mut stem = file_ref;
    for ext in DATASET_EXTENSIONS {
        if let Some(stripped) = strip_suffix_ignore_case(stem, ext)
            && let Some(without_dot) = stripped.strip_suffix('.')
        {
            stem = without_dot;
            break;
        }
    }
    stem.replace(EDIT_MARKER, "")
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Default raw counterpart handle for an edited dataset (edit marker removed).
pub fn default_raw_ref(file_ref: &str) -> String {
    file_ref.replace(EDIT_MARKER, "")
}

/// Synthesize a display title from a dataset handle.
///
/// Strips known suffixes, turns separators into spaces, and upper-cases the
/// first letter of each word: `vol1_2_edit.yaml` becomes `Vol1 2`.
pub fn format_story_title(file_ref: &str) -> DisplayTitle {
    story_stem(file_ref)
        .split(|ch: char| ch == '_' || ch == '-' || ch.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Truncate a title to `max_chars` characters, appending `...` when cut.
pub fn truncate_title(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_id_rewrites_known_tokens() {
        assert_eq!(normalize_id("Chapter_1_Segment_2"), "ch_1_seg_2");
        assert_eq!(normalize_id("Volume 1 - Chapter 3"), "vol_1_ch_3");
        assert_eq!(normalize_id("volume1chapter2"), "vol_1ch_2");
        assert_eq!(normalize_id("  School--Day  1 "), "school_day_1");
        assert_eq!(normalize_id("CHAPTER"), "ch");
    }

    #[test]
    fn normalize_id_only_rewrites_leading_volume() {
        assert_eq!(normalize_id("extra_volume_2"), "extra_volume_2");
        assert_eq!(normalize_id("__Volume_2"), "vol_2");
    }

    #[test]
    fn normalize_id_handles_empty_and_separator_only_input() {
        assert_eq!(normalize_id(""), "");
        assert_eq!(normalize_id("___"), "");
        assert_eq!(normalize_id(" - \t"), "");
    }

    #[test]
    fn normalize_id_is_idempotent() {
        let samples = [
            "",
            "Chapter_1_Segment_2",
            "_volume",
            "-Volume-chapter-",
            "chapterchapter",
            "chaptersegment",
            "Vol.1 Chapter 10 (Part A)",
            "Straße_Kapitel",
            "segment__segment--x",
            "volume_volume",
        ];
        for sample in samples {
            let once = normalize_id(sample);
            assert_eq!(normalize_id(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn story_stem_strips_extension_and_edit_marker() {
        assert_eq!(story_stem("junna_gmn_edit.yaml"), "junna_gmn");
        assert_eq!(story_stem("junna_1000_1.0_edit.YML"), "junna_1000_1.0");
        assert_eq!(story_stem("plain"), "plain");
        assert_eq!(default_raw_ref("vol1_edit.yaml"), "vol1.yaml");
    }

    #[test]
    fn format_story_title_title_cases_words() {
        assert_eq!(format_story_title("boardgame_1_edit.yaml"), "Boardgame 1");
        assert_eq!(format_story_title("vol_2_gmn_edit.yaml"), "Vol 2 Gmn");
        assert_eq!(format_story_title("school-life.json"), "School Life");
        assert_eq!(format_story_title("__odd__name__.yml"), "Odd Name");
    }

    #[test]
    fn truncate_title_counts_characters() {
        assert_eq!(truncate_title("short", 30), "short");
        assert_eq!(truncate_title("Khởi đầu cuộc chơi", 5), "Khởi ...");
    }

    #[test]
    fn normalize_inline_whitespace_collapses_runs() {
        let input = "Alpha\n\n  Beta\tGamma";
        assert_eq!(normalize_inline_whitespace(input), "Alpha Beta Gamma");
    }
}
