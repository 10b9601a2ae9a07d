//! Decode boundary between structured dataset text and `ChapterRecord`s.
//!
//! A dataset must decode to a sequence of mappings with `id`, `title`, and
//! `content`. Anything else fails with `ReaderError::DecodeFailure`; records
//! are never silently dropped or truncated.

use serde::Deserialize;

use crate::data::ChapterRecord;
use crate::errors::ReaderError;

/// Structured text format of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetFormat {
    /// YAML sequence of chapters.
    Yaml,
    /// JSON array of chapters.
    Json,
}

impl DatasetFormat {
    /// Pick the format from a location's extension; anything but `.json` is YAML.
    pub fn from_location(location: &str) -> Self {
        let is_json = location
            .rsplit_once('.')
            .map(|(_, ext)| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json { Self::Json } else { Self::Yaml }
    }
}

#[derive(Deserialize)]
struct RawChapter {
    id: ScalarText,
    title: ScalarText,
    content: String,
}

/// Scalar accepted where text is expected; integer ids are common in hand-written YAML.
///
/// Floats are rejected: `1.10` would otherwise decode to `1.1`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Text(String),
    Integer(i64),
}

impl ScalarText {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Integer(value) => value.to_string(),
        }
    }
}

impl RawChapter {
    fn into_record(self, index: usize, display_name: &str) -> Result<ChapterRecord, ReaderError> {
        let id = self.id.into_text();
        if id.trim().is_empty() {
            return Err(decode_failure(
                display_name,
                format!("chapter #{index} has an empty id"),
            ));
        }
        Ok(ChapterRecord {
            id,
            title: self.title.into_text(),
            content: self.content,
        })
    }
}

/// Decode dataset text into chapter records.
pub fn decode_chapters(
    text: &str,
    format: DatasetFormat,
    display_name: &str,
) -> Result<Vec<ChapterRecord>, ReaderError> {
    match format {
        DatasetFormat::Yaml => decode_yaml(text, display_name),
        DatasetFormat::Json => decode_json(text, display_name),
    }
}

fn decode_yaml(text: &str, display_name: &str) -> Result<Vec<ChapterRecord>, ReaderError> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|err| decode_failure(display_name, format!("invalid YAML: {err}")))?;
    let serde_yaml::Value::Sequence(items) = value else {
        return Err(expected_sequence(display_name));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_yaml::from_value::<RawChapter>(item)
                .map_err(|err| decode_failure(display_name, format!("chapter #{index}: {err}")))
                .and_then(|raw| raw.into_record(index, display_name))
        })
        .collect()
}

fn decode_json(text: &str, display_name: &str) -> Result<Vec<ChapterRecord>, ReaderError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| decode_failure(display_name, format!("invalid JSON: {err}")))?;
    let serde_json::Value::Array(items) = value else {
        return Err(expected_sequence(display_name));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<RawChapter>(item)
                .map_err(|err| decode_failure(display_name, format!("chapter #{index}: {err}")))
                .and_then(|raw| raw.into_record(index, display_name))
        })
        .collect()
}

fn expected_sequence(display_name: &str) -> ReaderError {
    decode_failure(display_name, "expected an array of chapters".to_string())
}

fn decode_failure(display_name: &str, details: String) -> ReaderError {
    ReaderError::DecodeFailure {
        display_name: display_name.to_string(),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_YAML: &str = r#"- id: Chapter_1_Segment_1
  title: "Khởi đầu cuộc chơi"
  content: |-
    Tôi ngồi đối diện với cô ấy.

    (Thực ra tôi chỉ biết luật cơ bản thôi...)
- id: 2
  title: Second
  content: Plain body
"#;

    #[test]
    fn decodes_yaml_sequence_and_numeric_ids() {
        let records = decode_chapters(SAMPLE_YAML, DatasetFormat::Yaml, "sample").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "Chapter_1_Segment_1");
        assert!(records[0].content.contains("\n\n(Thực ra"));
        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].title, "Second");
    }

    #[test]
    fn decodes_json_sequence() {
        let text = r#"[{"id": "a", "title": "A", "content": "body", "extra": true}]"#;
        let records = decode_chapters(text, DatasetFormat::Json, "sample.json").unwrap();
        assert_eq!(records, vec![ChapterRecord::new("a", "A", "body")]);
    }

    #[test]
    fn rejects_non_sequence_payloads() {
        let err = decode_chapters("title: not a list", DatasetFormat::Yaml, "Story A").unwrap_err();
        match err {
            ReaderError::DecodeFailure {
                display_name,
                details,
            } => {
                assert_eq!(display_name, "Story A");
                assert_eq!(details, "expected an array of chapters");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(decode_chapters("", DatasetFormat::Yaml, "empty").is_err());
        assert!(decode_chapters("{}", DatasetFormat::Json, "obj").is_err());
    }

    #[test]
    fn rejects_records_with_missing_or_empty_fields() {
        let missing_content = "- id: a\n  title: A\n";
        let err = decode_chapters(missing_content, DatasetFormat::Yaml, "s").unwrap_err();
        assert!(err.to_string().contains("chapter #0"));

        let empty_id = "- id: ''\n  title: A\n  content: body\n";
        let err = decode_chapters(empty_id, DatasetFormat::Yaml, "s").unwrap_err();
        assert!(err.to_string().contains("empty id"));

        let bad_second = "- id: a\n  title: A\n  content: ok\n- just a string\n";
        let err = decode_chapters(bad_second, DatasetFormat::Yaml, "s").unwrap_err();
        assert!(err.to_string().contains("chapter #1"));
    }

    #[test]
    fn rejects_float_ids_and_titles() {
        let float_id = "- id: '1.1'\n  title: A\n  content: a\n- id: 1.10\n  title: B\n  content: b\n";
        let err = decode_chapters(float_id, DatasetFormat::Yaml, "s").unwrap_err();
        assert!(matches!(err, ReaderError::DecodeFailure { .. }));
        assert!(err.to_string().contains("chapter #1"));

        let float_title = r#"[{"id": "a", "title": 2.5, "content": "body"}]"#;
        let err = decode_chapters(float_title, DatasetFormat::Json, "s.json").unwrap_err();
        assert!(err.to_string().contains("chapter #0"));

        let quoted = "- id: '1.10'\n  title: B\n  content: b\n";
        let records = decode_chapters(quoted, DatasetFormat::Yaml, "s").unwrap();
        assert_eq!(records[0].id, "1.10");
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(DatasetFormat::from_location("stories/a.json"), DatasetFormat::Json);
        assert_eq!(DatasetFormat::from_location("stories/a.JSON"), DatasetFormat::Json);
        assert_eq!(DatasetFormat::from_location("stories/a.yaml"), DatasetFormat::Yaml);
        assert_eq!(DatasetFormat::from_location("noext"), DatasetFormat::Yaml);
    }
}
