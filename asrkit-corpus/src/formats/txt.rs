//! Plain text transcripts
//!
//! One segment per non-empty line. Plain text has no timing, so parsed
//! segments span `0.0..0.0`.

use super::{FormatAdapter, FormatWriter};
use crate::models::Segment;
use asrkit_common::Result;

/// Plain text adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct TxtAdapter;

impl FormatAdapter for TxtAdapter {
    type Record = str;
    type Document = String;

    fn parse_segment(&self, line: &str) -> Option<Segment> {
        let seg = Segment::new(0.0, 0.0, line.trim());
        seg.validate().then_some(seg)
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

impl FormatWriter for TxtAdapter {
    fn footer(&self) -> String {
        "\n".to_string()
    }

    fn format_segment(&self, segment: &Segment) -> Result<String> {
        Ok(segment.text.trim().to_string())
    }
}
