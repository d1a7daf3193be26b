//! Canonical segment record
//!
//! Every format adapter produces [`Segment`]s and every writer consumes them.
//! Vendor-specific fields that have no canonical counterpart are dropped.

use asrkit_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Channel written when a segment carries none
pub const DEFAULT_CHANNEL: &str = "1";

/// Speaker written when a segment carries none
pub const DEFAULT_SPEAKER: &str = "UnknownSpeaker";

/// Label written when a segment carries none
pub const DEFAULT_LABEL: &str = "<o,f0,male>";

/// One time-bounded span of transcript text
///
/// Only `start`, `stop` and `text` are required. A segment is usable only if
/// [`Segment::validate`] holds; adapters drop segments that fail it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Source recording name, defaults to the owning transcript's base name
    pub filename: Option<String>,
    pub channel: Option<String>,
    pub speaker: Option<String>,
    /// Start offset in seconds
    pub start: f64,
    /// Stop offset in seconds
    pub stop: f64,
    /// Free-form annotation, e.g. `<o,f0,female>`
    pub label: Option<String>,
    pub text: String,
    /// Punctuated / post-processed variant of `text`
    pub formatted_text: Option<String>,
    /// Recognizer confidence in [0, 1]
    pub confidence: Option<f64>,
}

impl Segment {
    /// Create a segment with only the required fields set
    pub fn new(start: f64, stop: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            stop,
            text: text.into(),
            ..Default::default()
        }
    }

    /// True iff the times are finite with `stop >= start` and the text is
    /// non-empty after trimming
    pub fn validate(&self) -> bool {
        self.start.is_finite()
            && self.stop.is_finite()
            && self.stop >= self.start
            && !self.text.trim().is_empty()
    }

    /// Number of whitespace-delimited tokens in `text`
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Target fields of a [`Segment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentField {
    Filename,
    Channel,
    Speaker,
    Start,
    Stop,
    Label,
    Text,
    FormattedText,
    Confidence,
}

/// Partially extracted segment
///
/// Adapters fill this from a vendor record, then call [`SegmentFields::build`]
/// which fails if a required field never showed up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentFields {
    pub filename: Option<String>,
    pub channel: Option<String>,
    pub speaker: Option<String>,
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub label: Option<String>,
    pub text: Option<String>,
    pub formatted_text: Option<String>,
    pub confidence: Option<f64>,
}

impl SegmentFields {
    /// Convert into a segment, requiring start, stop and text
    pub fn build(self) -> Result<Segment> {
        let start = self
            .start
            .ok_or_else(|| Error::Parse("segment is missing a start time".to_string()))?;
        let stop = self
            .stop
            .ok_or_else(|| Error::Parse("segment is missing a stop time".to_string()))?;
        let text = self
            .text
            .ok_or_else(|| Error::Parse("segment is missing text".to_string()))?;

        Ok(Segment {
            filename: self.filename,
            channel: self.channel,
            speaker: self.speaker,
            start,
            stop,
            label: self.label,
            text,
            formatted_text: self.formatted_text,
            confidence: self.confidence,
        })
    }
}
