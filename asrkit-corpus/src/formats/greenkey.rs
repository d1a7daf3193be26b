//! GreenKey JSON reader and writer
//!
//! Documents hold a `segments` array. Each element is mapped through
//! [`GREENKEY_FIELDS`]; aliases for the same canonical field are listed in
//! priority order, so `corrected_transcript` overrides `transcript` and
//! `endTimeSec` overrides `stopTimeSec` when both are present.
//!
//! The writer emits one JSON object per line inside
//! `{"segments":[ ... ]}`.

use super::field_map::{apply_rules, FieldRule, PathStep, Transform};
use super::{FormatAdapter, FormatWriter};
use crate::models::{Segment, SegmentField};
use asrkit_common::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Field table for one GreenKey segment, evaluated top to bottom
pub const GREENKEY_FIELDS: &[FieldRule] = &[
    FieldRule::new(&[PathStep::Key("channel")], SegmentField::Channel, Transform::Text),
    FieldRule::new(&[PathStep::Key("startTimeSec")], SegmentField::Start, Transform::Seconds),
    FieldRule::new(&[PathStep::Key("stopTimeSec")], SegmentField::Stop, Transform::Seconds),
    FieldRule::new(&[PathStep::Key("endTimeSec")], SegmentField::Stop, Transform::Seconds),
    FieldRule::new(&[PathStep::Key("transcript")], SegmentField::Text, Transform::Text),
    FieldRule::new(
        &[PathStep::Key("corrected_transcript")],
        SegmentField::Text,
        Transform::Text,
    ),
    FieldRule::new(
        &[PathStep::Key("formatted_transcript")],
        SegmentField::FormattedText,
        Transform::Text,
    ),
    FieldRule::new(
        &[PathStep::Key("punctuated_transcript")],
        SegmentField::FormattedText,
        Transform::Text,
    ),
    FieldRule::new(
        &[PathStep::Key("speakerInfo")],
        SegmentField::Speaker,
        Transform::SanitizedName,
    ),
    FieldRule::new(
        &[PathStep::Key("genderInfo"), PathStep::Key("gender")],
        SegmentField::Label,
        Transform::GenderLabel,
    ),
    FieldRule::new(&[PathStep::Key("confidence")], SegmentField::Confidence, Transform::Number),
];

/// GreenKey adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct GreenKeyAdapter;

#[derive(Serialize)]
struct GenderInfo<'a> {
    gender: &'a str,
}

#[derive(Serialize)]
struct GreenKeyRecord<'a> {
    #[serde(rename = "speakerInfo")]
    speaker_info: Option<&'a str>,
    #[serde(rename = "startTimeSec")]
    start_time_sec: f64,
    #[serde(rename = "endTimeSec")]
    end_time_sec: f64,
    #[serde(rename = "genderInfo", skip_serializing_if = "Option::is_none")]
    gender_info: Option<GenderInfo<'a>>,
    transcript: &'a str,
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted_transcript: Option<&'a str>,
}

/// Gender part of an STM label: last comma field without the closing `>`
fn gender_from_label(label: &str) -> &str {
    label
        .rsplit(',')
        .next()
        .unwrap_or(label)
        .trim_end_matches('>')
}

impl FormatAdapter for GreenKeyAdapter {
    type Record = Value;
    type Document = Value;

    fn parse_segment(&self, record: &Value) -> Option<Segment> {
        let seg = match apply_rules(GREENKEY_FIELDS, record)
            .map_err(Error::from)
            .and_then(|fields| fields.build())
        {
            Ok(seg) => seg,
            Err(e) => {
                warn!(error = %e, "Dropping malformed GreenKey segment");
                return None;
            }
        };

        if seg.validate() {
            Some(seg)
        } else {
            debug!(start = seg.start, stop = seg.stop, "Dropping invalid GreenKey segment");
            None
        }
    }

    fn parse_document(&self, payload: &str) -> Result<Value> {
        Ok(serde_json::from_str(payload)?)
    }

    fn read_in_memory(&self, document: &Value) -> Vec<Segment> {
        let Some(records) = document.get("segments").and_then(Value::as_array) else {
            warn!("GreenKey document has no segments array");
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| self.parse_segment(record))
            .collect()
    }
}

impl FormatWriter for GreenKeyAdapter {
    fn header(&self) -> String {
        "{\n\"segments\":[".to_string()
    }

    fn footer(&self) -> String {
        "]}\n".to_string()
    }

    fn separator(&self) -> &'static str {
        ",\n"
    }

    fn format_segment(&self, segment: &Segment) -> Result<String> {
        let record = GreenKeyRecord {
            speaker_info: segment.speaker.as_deref(),
            start_time_sec: segment.start,
            end_time_sec: segment.stop,
            gender_info: segment.label.as_deref().map(|label| GenderInfo {
                gender: gender_from_label(label),
            }),
            transcript: &segment.text,
            confidence: segment.confidence,
            channel: segment.channel.as_deref(),
            formatted_transcript: segment
                .formatted_text
                .as_deref()
                .filter(|text| !text.is_empty()),
        };
        Ok(serde_json::to_string(&record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_corrected_transcript_wins() {
        let record = json!({
            "startTimeSec": 0.0,
            "endTimeSec": 1.0,
            "transcript": "original words",
            "corrected_transcript": "corrected words"
        });
        let seg = GreenKeyAdapter.parse_segment(&record).unwrap();
        assert_eq!(seg.text, "corrected words");
    }

    #[test]
    fn test_full_field_mapping() {
        let record = json!({
            "channel": 2,
            "startTimeSec": "1.5",
            "stopTimeSec": 2.0,
            "transcript": "hello there",
            "punctuated_transcript": "Hello there.",
            "speakerInfo": "Dr Smith",
            "genderInfo": {"gender": "female"},
            "confidence": 0.87
        });
        let seg = GreenKeyAdapter.parse_segment(&record).unwrap();
        assert_eq!(seg.channel.as_deref(), Some("2"));
        assert_eq!(seg.start, 1.5);
        assert_eq!(seg.stop, 2.0);
        assert_eq!(seg.formatted_text.as_deref(), Some("Hello there."));
        assert_eq!(seg.speaker.as_deref(), Some("Dr_Smith"));
        assert_eq!(seg.label.as_deref(), Some("<o,f0,female>"));
        assert_eq!(seg.confidence, Some(0.87));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let record = json!({
            "startTimeSec": 0.0,
            "endTimeSec": 1.0,
            "transcript": "words",
            "formatted_transcript": "",
            "speakerInfo": null
        });
        let seg = GreenKeyAdapter.parse_segment(&record).unwrap();
        assert_eq!(seg.formatted_text, None);
        assert_eq!(seg.speaker, None);
    }

    #[test]
    fn test_non_numeric_confidence_keeps_segment() {
        let record = json!({
            "startTimeSec": 0.0,
            "endTimeSec": 1.0,
            "transcript": "still here",
            "confidence": "high"
        });
        let seg = GreenKeyAdapter.parse_segment(&record).unwrap();
        assert_eq!(seg.text, "still here");
        assert_eq!(seg.confidence, None);
    }

    #[test]
    fn test_bad_elements_do_not_abort_batch() {
        let doc = json!({"segments": [
            {"startTimeSec": "later", "endTimeSec": 1.0, "transcript": "bad time"},
            {"startTimeSec": 0.0, "endTimeSec": 1.0},
            {"startTimeSec": 2.0, "endTimeSec": 1.0, "transcript": "reversed"},
            {"startTimeSec": 3.0, "endTimeSec": 4.0, "transcript": "good"}
        ]});
        let segments = GreenKeyAdapter.read_in_memory(&doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "good");
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let original = Segment {
            speaker: Some("spk_1".to_string()),
            label: Some("<o,f0,male>".to_string()),
            formatted_text: Some("Hi, you.".to_string()),
            confidence: Some(0.5),
            ..Segment::new(0.25, 1.75, "hi you")
        };
        let plain = Segment {
            formatted_text: Some(String::new()),
            ..Segment::new(2.0, 3.0, "second")
        };

        let doc = GreenKeyAdapter
            .write_segments(&[original.clone(), plain])
            .unwrap();
        assert!(doc.starts_with("{\n\"segments\":["));
        assert!(doc.ends_with("]}\n"));

        let parsed = GreenKeyAdapter.read_str(&doc).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], original);
        assert_eq!(parsed[1].formatted_text, None);
        assert_eq!(parsed[1].confidence, None);
    }

    #[test]
    fn test_gender_from_label() {
        assert_eq!(gender_from_label("<o,f0,female>"), "female");
        assert_eq!(gender_from_label("male"), "male");
    }
}
