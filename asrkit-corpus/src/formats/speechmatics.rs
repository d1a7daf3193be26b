//! Speechmatics JSON (v2) reader
//!
//! Each entry of `results` becomes one segment. Text, speaker and confidence
//! come from the first alternative.

use super::field_map::{apply_rules, FieldRule, PathStep, Transform};
use super::FormatAdapter;
use crate::models::{Segment, SegmentField};
use asrkit_common::{Error, Result};
use serde_json::Value;
use tracing::{debug, warn};

const FIRST_ALTERNATIVE: PathStep = PathStep::Index(0);

/// Field table for one Speechmatics result, evaluated top to bottom
pub const SPEECHMATICS_FIELDS: &[FieldRule] = &[
    FieldRule::new(&[PathStep::Key("channel")], SegmentField::Channel, Transform::Text),
    FieldRule::new(&[PathStep::Key("start_time")], SegmentField::Start, Transform::Seconds),
    FieldRule::new(&[PathStep::Key("end_time")], SegmentField::Stop, Transform::Seconds),
    FieldRule::new(
        &[PathStep::Key("alternatives"), FIRST_ALTERNATIVE, PathStep::Key("content")],
        SegmentField::Text,
        Transform::Text,
    ),
    FieldRule::new(
        &[PathStep::Key("alternatives"), FIRST_ALTERNATIVE, PathStep::Key("speaker")],
        SegmentField::Speaker,
        Transform::Text,
    ),
    FieldRule::new(
        &[PathStep::Key("alternatives"), FIRST_ALTERNATIVE, PathStep::Key("confidence")],
        SegmentField::Confidence,
        Transform::Number,
    ),
];

/// Speechmatics adapter (read-only)
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeechmaticsAdapter;

impl FormatAdapter for SpeechmaticsAdapter {
    type Record = Value;
    type Document = Value;

    fn parse_segment(&self, record: &Value) -> Option<Segment> {
        let seg = match apply_rules(SPEECHMATICS_FIELDS, record)
            .map_err(Error::from)
            .and_then(|fields| fields.build())
        {
            Ok(seg) => seg,
            Err(e) => {
                warn!(error = %e, "Dropping malformed Speechmatics result");
                return None;
            }
        };

        if seg.validate() {
            Some(seg)
        } else {
            debug!(start = seg.start, stop = seg.stop, "Dropping invalid Speechmatics result");
            None
        }
    }

    fn parse_document(&self, payload: &str) -> Result<Value> {
        Ok(serde_json::from_str(payload)?)
    }

    fn read_in_memory(&self, document: &Value) -> Vec<Segment> {
        document
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(|r| self.parse_segment(r))
                    .collect()
            })
            .unwrap_or_default()
    }
}
