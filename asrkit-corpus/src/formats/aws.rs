//! AWS Transcribe JSON reader
//!
//! AWS emits one flat token list per job under `results.items`. The whole
//! document collapses into a single segment spanning the earliest
//! `start_time` to the latest `end_time`, with the token contents joined by
//! spaces. Punctuation tokens carry no times but still contribute text.

use super::field_map::value_as_f64;
use super::FormatAdapter;
use crate::models::Segment;
use asrkit_common::{Error, Result};
use serde_json::Value;
use tracing::warn;

/// AWS Transcribe adapter (read-only)
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsAdapter;

impl AwsAdapter {
    fn extract(&self, document: &Value) -> Result<Segment> {
        let items = document
            .get("results")
            .and_then(|r| r.get("items"))
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Parse("missing results.items".to_string()))?;

        let start = timed_values(items, "start_time")?
            .into_iter()
            .reduce(f64::min)
            .ok_or_else(|| Error::Parse("no item carries a start_time".to_string()))?;
        let stop = timed_values(items, "end_time")?
            .into_iter()
            .reduce(f64::max)
            .ok_or_else(|| Error::Parse("no item carries an end_time".to_string()))?;

        let words = items
            .iter()
            .map(|item| {
                item.get("alternatives")
                    .and_then(|alts| alts.get(0))
                    .and_then(|alt| alt.get("content"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::Parse("item without alternatives[0].content".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Segment::new(start, stop, words.join(" ")))
    }
}

/// Collect the numeric values of `key` from every item that has one
fn timed_values(items: &[Value], key: &str) -> Result<Vec<f64>> {
    items
        .iter()
        .filter_map(|item| item.get(key))
        .filter(|v| !v.is_null() && v.as_str() != Some(""))
        .map(|v| {
            value_as_f64(v).ok_or_else(|| Error::Parse(format!("{} is not numeric: {}", key, v)))
        })
        .collect()
}

impl FormatAdapter for AwsAdapter {
    type Record = Value;
    type Document = Value;

    fn parse_segment(&self, record: &Value) -> Option<Segment> {
        match self.extract(record) {
            Ok(seg) if seg.validate() => Some(seg),
            Ok(seg) => {
                warn!(start = seg.start, stop = seg.stop, "Dropping invalid AWS segment");
                None
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed AWS document");
                None
            }
        }
    }

    fn parse_document(&self, payload: &str) -> Result<Value> {
        Ok(serde_json::from_str(payload)?)
    }

    fn read_in_memory(&self, document: &Value) -> Vec<Segment> {
        self.parse_segment(document).into_iter().collect()
    }
}
