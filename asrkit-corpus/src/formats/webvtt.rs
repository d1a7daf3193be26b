//! WebVTT caption reader and writer
//!
//! Captions are read into [`Cue`]s first; each cue then becomes a segment
//! after bracketed non-transcript marks such as `[MUSIC]` or `[laughter]`
//! are stripped from its text.

use super::{FormatAdapter, FormatWriter};
use crate::models::Segment;
use asrkit_common::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

/// Bracketed annotation tokens that are not part of the transcript
static NON_TRANSCRIPT_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Za-z0-9]+\]").expect("non-transcript mark pattern is valid"));

/// One caption cue
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub start_in_seconds: f64,
    pub end_in_seconds: f64,
    /// Raw cue payload, lines joined with `\n`
    pub text: String,
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` (a `,` decimal mark is accepted)
pub fn parse_timestamp(stamp: &str) -> Result<f64> {
    let stamp = stamp.trim().replace(',', ".");
    let parts: Vec<&str> = stamp.split(':').collect();
    let bad = || Error::Parse(format!("invalid caption timestamp: {}", stamp));

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (
            h.parse::<u64>().map_err(|_| bad())?,
            m.parse::<u64>().map_err(|_| bad())?,
            s.parse::<f64>().map_err(|_| bad())?,
        ),
        [m, s] => (
            0,
            m.parse::<u64>().map_err(|_| bad())?,
            s.parse::<f64>().map_err(|_| bad())?,
        ),
        _ => return Err(bad()),
    };

    let whole = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .ok_or_else(bad)?;
    Ok(whole as f64 + seconds)
}

/// Render seconds as `HH:MM:SS.mmm`
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let (hours, rest) = (total_ms / 3_600_000, total_ms % 3_600_000);
    let (minutes, rest) = (rest / 60_000, rest % 60_000);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, rest / 1000, rest % 1000)
}

/// Parse one blank-line-delimited cue block; `Ok(None)` for non-cue blocks
fn parse_cue_block(block: &str) -> Result<Option<Cue>> {
    let mut lines = block.lines();
    let Some(timing) = lines.by_ref().find(|line| line.contains("-->")) else {
        return Ok(None);
    };

    let (start, rest) = timing
        .split_once("-->")
        .ok_or_else(|| Error::Parse(format!("invalid cue timing: {}", timing)))?;
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::Parse(format!("cue timing without end: {}", timing)))?;

    Ok(Some(Cue {
        start_in_seconds: parse_timestamp(start)?,
        end_in_seconds: parse_timestamp(end)?,
        text: lines.collect::<Vec<_>>().join("\n"),
    }))
}

/// WebVTT adapter
#[derive(Debug, Clone, Copy, Default)]
pub struct VttAdapter;

impl FormatAdapter for VttAdapter {
    type Record = Cue;
    type Document = Vec<Cue>;

    fn parse_segment(&self, cue: &Cue) -> Option<Segment> {
        let text = NON_TRANSCRIPT_MARKS
            .replace_all(cue.text.trim(), "")
            .trim()
            .to_string();
        let seg = Segment::new(cue.start_in_seconds, cue.end_in_seconds, text);

        if seg.validate() {
            Some(seg)
        } else {
            debug!(start = seg.start, stop = seg.stop, "Dropping empty or invalid caption");
            None
        }
    }

    fn parse_document(&self, payload: &str) -> Result<Vec<Cue>> {
        let normalized = payload.trim_start_matches('\u{feff}').replace("\r\n", "\n");
        if !normalized.trim_start().starts_with("WEBVTT") {
            return Err(Error::Parse("missing WEBVTT signature".to_string()));
        }

        let mut cues = Vec::new();
        for block in normalized.split("\n\n").skip(1) {
            let block = block.trim_matches('\n');
            if block.is_empty() || block.starts_with("NOTE") || block.starts_with("STYLE") {
                continue;
            }
            match parse_cue_block(block) {
                Ok(Some(cue)) => cues.push(cue),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Dropping malformed caption cue"),
            }
        }
        Ok(cues)
    }

    fn read_in_memory(&self, cues: &Vec<Cue>) -> Vec<Segment> {
        cues.iter().filter_map(|cue| self.parse_segment(cue)).collect()
    }
}

impl FormatWriter for VttAdapter {
    fn header(&self) -> String {
        "WEBVTT\n\n".to_string()
    }

    fn footer(&self) -> String {
        "\n".to_string()
    }

    fn separator(&self) -> &'static str {
        "\n\n"
    }

    fn format_segment(&self, segment: &Segment) -> Result<String> {
        Ok(format!(
            "{} --> {}\n{}",
            format_timestamp(segment.start),
            format_timestamp(segment.stop),
            cue_payload(&segment.text)
        ))
    }
}

/// Cue text with blank lines removed; a blank line would end the cue
fn cue_payload(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\
\n\
NOTE produced by a captioner\n\
\n\
1\n\
00:00:01.000 --> 00:00:02.500 align:start\n\
[MUSIC] welcome back\n\
\n\
00:03.000 --> 00:04.000\n\
[laughter]\n\
\n\
00:00:05.000 --> 00:00:07.250\n\
two line\n\
caption\n";

    #[test]
    fn test_parse_timestamps() {
        assert_eq!(parse_timestamp("00:00:01.500").unwrap(), 1.5);
        assert_eq!(parse_timestamp("01:02:03.000").unwrap(), 3723.0);
        assert_eq!(parse_timestamp("02:03,250").unwrap(), 123.25);
        assert!(parse_timestamp("soon").is_err());
    }

    #[test]
    fn test_oversized_timestamp_is_error() {
        assert!(parse_timestamp("99999999999999999:00:00.000").is_err());
        assert!(parse_timestamp("00:99999999999999999999:00.000").is_err());
    }

    #[test]
    fn test_oversized_cue_is_dropped() {
        let doc = "WEBVTT\n\n99999999999999999:00:00.000 --> 99999999999999999:00:01.000\nlost\n\n\
                   00:00:01.000 --> 00:00:02.000\nkept\n";
        let segments = VttAdapter.read_str(doc).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "kept");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(3723.25), "01:02:03.250");
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
    }

    #[test]
    fn test_marks_are_stripped_and_empty_cues_dropped() {
        let segments = VttAdapter.read_str(SAMPLE).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "welcome back");
        assert_eq!(segments[0].start, 1.0);
        assert_eq!(segments[0].stop, 2.5);
        assert_eq!(segments[1].text, "two line\ncaption");
    }

    #[test]
    fn test_missing_signature_is_error() {
        assert!(VttAdapter.read_str("00:00:01.000 --> 00:00:02.000\nhi\n").is_err());
    }

    #[test]
    fn test_write_then_read() {
        let segs = vec![Segment::new(1.0, 2.5, "first"), Segment::new(3.0, 4.0, "second")];
        let doc = VttAdapter.write_segments(&segs).unwrap();
        assert!(doc.starts_with("WEBVTT\n\n00:00:01.000 --> 00:00:02.500\nfirst"));
        assert_eq!(VttAdapter.read_str(&doc).unwrap(), segs);
    }

    #[test]
    fn test_paragraph_breaks_stay_inside_cue() {
        let segs = vec![
            Segment::new(0.0, 1.0, "para one\n\npara two"),
            Segment::new(1.0, 2.0, "after"),
        ];
        let doc = VttAdapter.write_segments(&segs).unwrap();
        assert!(!doc.contains("para one\n\n"));

        let reread = VttAdapter.read_str(&doc).unwrap();
        assert_eq!(reread.len(), 2);
        assert_eq!(reread[0].text, "para one\npara two");
        assert_eq!(reread[1].text, "after");
    }
}
