//! STM (segment time mark) reader and writer
//!
//! One line per segment:
//!
//! ```text
//! filename channel speaker start stop label text ...
//! ```
//!
//! Lines with fewer than seven whitespace-delimited tokens carry no text and
//! are skipped.

use super::{format_seconds, FormatAdapter, FormatWriter};
use crate::models::segment::{DEFAULT_CHANNEL, DEFAULT_LABEL, DEFAULT_SPEAKER};
use crate::models::Segment;
use crate::services::text_cleanup::clean_up;
use asrkit_common::Result;
use tracing::debug;

/// Filename written when neither the segment nor its transcript names one
pub const DEFAULT_FILENAME: &str = "unknown";

/// STM adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct StmAdapter;

impl FormatAdapter for StmAdapter {
    type Record = str;
    type Document = String;

    fn parse_segment(&self, line: &str) -> Option<Segment> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 7 {
            return None;
        }

        let (start, stop) = match (tokens[3].parse::<f64>(), tokens[4].parse::<f64>()) {
            (Ok(start), Ok(stop)) => (start, stop),
            _ => {
                debug!(line = %line.trim(), "Skipping STM line with non-numeric times");
                return None;
            }
        };

        let seg = Segment {
            filename: Some(tokens[0].to_string()),
            channel: Some(tokens[1].to_string()),
            speaker: Some(tokens[2].to_string()),
            label: Some(tokens[5].to_string()),
            ..Segment::new(start, stop, tokens[6..].join(" "))
        };

        if seg.validate() {
            Some(seg)
        } else {
            debug!(line = %line.trim(), "Skipping invalid STM line");
            None
        }
    }

    fn parse_document(&self, payload: &str) -> Result<String> {
        Ok(payload.to_string())
    }

    fn read_in_memory(&self, document: &String) -> Vec<Segment> {
        document
            .lines()
            .filter_map(|line| self.parse_segment(line))
            .collect()
    }
}

impl FormatWriter for StmAdapter {
    fn footer(&self) -> String {
        "\n".to_string()
    }

    fn format_segment(&self, segment: &Segment) -> Result<String> {
        Ok([
            segment.filename.as_deref().unwrap_or(DEFAULT_FILENAME).to_string(),
            segment.channel.as_deref().unwrap_or(DEFAULT_CHANNEL).to_string(),
            segment.speaker.as_deref().unwrap_or(DEFAULT_SPEAKER).to_string(),
            format_seconds(segment.start),
            format_seconds(segment.stop),
            segment.label.as_deref().unwrap_or(DEFAULT_LABEL).to_string(),
            clean_up(&segment.text),
        ]
        .join(" "))
    }
}
