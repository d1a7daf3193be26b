//! Rev.ai JSON reader
//!
//! One segment per monologue. Rev elements already carry their own spacing
//! and punctuation tokens, so values are concatenated without a separator.

use super::field_map::{value_as_f64, value_as_text};
use super::FormatAdapter;
use crate::models::Segment;
use asrkit_common::{Error, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Rev.ai adapter (read-only)
#[derive(Debug, Clone, Copy, Default)]
pub struct RevAdapter;

impl RevAdapter {
    fn extract(&self, monologue: &Value) -> Result<Segment> {
        let elements = monologue
            .get("elements")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Parse("monologue without elements".to_string()))?;

        let mut start: Option<f64> = None;
        let mut stop: Option<f64> = None;
        let mut text = String::new();

        for element in elements {
            if let Some(ts) = element.get("ts") {
                let ts = value_as_f64(ts)
                    .ok_or_else(|| Error::Parse(format!("ts is not numeric: {}", ts)))?;
                start = Some(start.map_or(ts, |s| s.min(ts)));
            }
            if let Some(end_ts) = element.get("end_ts") {
                let end_ts = value_as_f64(end_ts)
                    .ok_or_else(|| Error::Parse(format!("end_ts is not numeric: {}", end_ts)))?;
                stop = Some(stop.map_or(end_ts, |s| s.max(end_ts)));
            }
            let value = element
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Parse("element without value".to_string()))?;
            text.push_str(value);
        }

        let start = start.ok_or_else(|| Error::Parse("no element carries ts".to_string()))?;
        let stop = stop.ok_or_else(|| Error::Parse("no element carries end_ts".to_string()))?;

        Ok(Segment {
            speaker: monologue.get("speaker").and_then(value_as_text),
            ..Segment::new(start, stop, text)
        })
    }
}

impl FormatAdapter for RevAdapter {
    type Record = Value;
    type Document = Value;

    fn parse_segment(&self, record: &Value) -> Option<Segment> {
        match self.extract(record) {
            Ok(seg) if seg.validate() => Some(seg),
            Ok(_) => {
                debug!("Dropping invalid Rev monologue");
                None
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed Rev monologue");
                None
            }
        }
    }

    fn parse_document(&self, payload: &str) -> Result<Value> {
        Ok(serde_json::from_str(payload)?)
    }

    fn read_in_memory(&self, document: &Value) -> Vec<Segment> {
        document
            .get("monologues")
            .and_then(Value::as_array)
            .map(|monologues| {
                monologues
                    .iter()
                    .filter_map(|m| self.parse_segment(m))
                    .collect()
            })
            .unwrap_or_default()
    }
}
