//! Dataset size classification and catalog descriptions.

use crate::config::SizeThresholds;
use crate::constants::heuristics::DESCRIPTION_SEPARATOR;
use crate::data::SizeClass;

/// Classify a dataset as large when either its file size or chapter count exceeds the thresholds.
pub fn classify_size(size_bytes: u64, chapter_count: usize, thresholds: &SizeThresholds) -> SizeClass {
    let size_kb = size_bytes / 1024;
    if size_kb > thresholds.large_file_kb || chapter_count > thresholds.large_chapter_count {
        SizeClass::Large
    } else {
        SizeClass::Normal
    }
}

/// Short size label, e.g. `340KB`.
pub fn format_size_kb(size_bytes: u64) -> String {
    format!("{}KB", size_bytes / 1024)
}

/// Size in MiB rounded to one decimal, only reported above 1 MiB.
pub fn size_mb(size_bytes: u64) -> Option<f64> {
    let size_kb = size_bytes / 1024;
    if size_kb <= 1024 {
        return None;
    }
    Some((size_kb as f64 / 1024.0 * 10.0).round() / 10.0)
}

/// Human-readable catalog description, e.g. `1200 chapters • 6144KB • 6.0MB • large file`.
pub fn describe_story(chapter_count: usize, size_bytes: u64, size_class: SizeClass) -> String {
    let mut parts = vec![
        format!("{chapter_count} chapters"),
        format_size_kb(size_bytes),
    ];
    if let Some(mb) = size_mb(size_bytes) {
        parts.push(format!("{mb:.1}MB"));
    }
    if size_class == SizeClass::Large {
        parts.push("large file".to_string());
    }
    parts.join(DESCRIPTION_SEPARATOR)
}

/// Format an integer with thousands separators.
pub fn format_with_commas(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_size_checks_both_thresholds() {
        let thresholds = SizeThresholds::default();
        assert_eq!(classify_size(10 * 1024, 10, &thresholds), SizeClass::Normal);
        assert_eq!(classify_size(5_001 * 1024, 10, &thresholds), SizeClass::Large);
        assert_eq!(classify_size(5_000 * 1024, 10, &thresholds), SizeClass::Normal);
        assert_eq!(classify_size(1024, 1_001, &thresholds), SizeClass::Large);
    }

    #[test]
    fn describe_story_appends_megabytes_and_large_marker() {
        assert_eq!(
            describe_story(3, 2048, SizeClass::Normal),
            "3 chapters • 2KB"
        );
        assert_eq!(
            describe_story(1200, 6 * 1024 * 1024, SizeClass::Large),
            "1200 chapters • 6144KB • 6.0MB • large file"
        );
    }

    #[test]
    fn format_with_commas_groups_thousands() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1_000), "1,000");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }
}
