//! Transcript format adapters
//!
//! Each vendor dialect gets one adapter that maps its records onto the
//! canonical [`Segment`]. [`FileFormat`] selects the adapter for a file.
//!
//! Adapter contract:
//! - `parse_segment` never fails to its caller. Malformed records are logged
//!   and yield `None`.
//! - Readers filter out `None`, so callers only ever see valid segments.
//! - Writers (where a format has one) are the inverse of the reader mapping.

pub mod aws;
pub mod field_map;
pub mod greenkey;
pub mod rev;
pub mod speechmatics;
pub mod stm;
pub mod txt;
pub mod webvtt;

pub use aws::AwsAdapter;
pub use greenkey::GreenKeyAdapter;
pub use rev::RevAdapter;
pub use speechmatics::SpeechmaticsAdapter;
pub use stm::StmAdapter;
pub use txt::TxtAdapter;
pub use webvtt::{Cue, VttAdapter};

use crate::models::Segment;
use asrkit_common::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Reads one transcript dialect into canonical segments
pub trait FormatAdapter {
    /// One vendor record (JSON object, text line, caption cue)
    type Record: ?Sized;
    /// A whole parsed input document
    type Document;

    /// Map one record onto a valid segment, or `None`
    fn parse_segment(&self, record: &Self::Record) -> Option<Segment>;

    /// Parse raw file content into a document
    fn parse_document(&self, payload: &str) -> Result<Self::Document>;

    /// Extract every valid segment from a parsed document, in source order
    fn read_in_memory(&self, document: &Self::Document) -> Vec<Segment>;

    /// Parse raw content and extract its segments
    fn read_str(&self, payload: &str) -> Result<Vec<Segment>> {
        let document = self.parse_document(payload)?;
        Ok(self.read_in_memory(&document))
    }

    /// Read a file and extract its segments
    fn read_file(&self, path: &Path) -> Result<Vec<Segment>> {
        let content = std::fs::read_to_string(path)?;
        self.read_str(&content)
    }
}

/// Serializes canonical segments into one dialect
pub trait FormatWriter {
    fn header(&self) -> String {
        String::new()
    }

    fn footer(&self) -> String {
        String::new()
    }

    fn separator(&self) -> &'static str {
        "\n"
    }

    /// Render one segment
    fn format_segment(&self, segment: &Segment) -> Result<String>;

    /// Render a full document: header, separated segments, footer
    fn write_segments(&self, segments: &[Segment]) -> Result<String> {
        let body = segments
            .iter()
            .map(|seg| self.format_segment(seg))
            .collect::<Result<Vec<_>>>()?
            .join(self.separator());
        Ok(format!("{}{}{}", self.header(), body, self.footer()))
    }
}

/// Supported transcript dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Stm,
    Aws,
    GreenKey,
    Speechmatics,
    Rev,
    Vtt,
    Txt,
}

impl FileFormat {
    /// Every supported format
    pub const ALL: [FileFormat; 7] = [
        FileFormat::Stm,
        FileFormat::Aws,
        FileFormat::GreenKey,
        FileFormat::Speechmatics,
        FileFormat::Rev,
        FileFormat::Vtt,
        FileFormat::Txt,
    ];

    /// Format identifier, e.g. `json-gk`
    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Stm => "stm",
            FileFormat::Aws => "json-aws",
            FileFormat::GreenKey => "json-gk",
            FileFormat::Speechmatics => "json-speechmatics",
            FileFormat::Rev => "json-rev",
            FileFormat::Vtt => "vtt",
            FileFormat::Txt => "txt",
        }
    }

    /// File extension used on disk
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Stm => "stm",
            FileFormat::Aws | FileFormat::GreenKey | FileFormat::Speechmatics | FileFormat::Rev => {
                "json"
            }
            FileFormat::Vtt => "vtt",
            FileFormat::Txt => "txt",
        }
    }

    /// True for dialects with a writer
    pub fn is_writable(self) -> bool {
        matches!(
            self,
            FileFormat::Stm | FileFormat::GreenKey | FileFormat::Vtt | FileFormat::Txt
        )
    }

    /// Pick a JSON dialect from the shape of a document
    ///
    /// `results.items` ⇒ AWS, `results` array ⇒ Speechmatics,
    /// `monologues` ⇒ Rev, anything else ⇒ GreenKey.
    pub fn detect_json(document: &Value) -> FileFormat {
        match document.get("results") {
            Some(results) if results.get("items").is_some() => FileFormat::Aws,
            Some(Value::Array(_)) => FileFormat::Speechmatics,
            _ if document.get("monologues").is_some() => FileFormat::Rev,
            _ => FileFormat::GreenKey,
        }
    }

    /// Format implied by a path's extension; `None` for plain `.json`, which
    /// needs its content inspected
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => None,
            other => other.parse().ok(),
        }
    }

    /// Extract segments from raw content in this format
    pub fn read_str(self, payload: &str) -> Result<Vec<Segment>> {
        match self {
            FileFormat::Stm => StmAdapter.read_str(payload),
            FileFormat::Aws => AwsAdapter.read_str(payload),
            FileFormat::GreenKey => GreenKeyAdapter.read_str(payload),
            FileFormat::Speechmatics => SpeechmaticsAdapter.read_str(payload),
            FileFormat::Rev => RevAdapter.read_str(payload),
            FileFormat::Vtt => VttAdapter.read_str(payload),
            FileFormat::Txt => TxtAdapter.read_str(payload),
        }
    }

    /// Extract segments from an in-memory JSON document
    pub fn read_json(self, document: &Value) -> Result<Vec<Segment>> {
        match self {
            FileFormat::Aws => Ok(AwsAdapter.read_in_memory(document)),
            FileFormat::GreenKey => Ok(GreenKeyAdapter.read_in_memory(document)),
            FileFormat::Speechmatics => Ok(SpeechmaticsAdapter.read_in_memory(document)),
            FileFormat::Rev => Ok(RevAdapter.read_in_memory(document)),
            other => Err(Error::InvalidInput(format!(
                "{} is not a JSON format",
                other
            ))),
        }
    }

    /// Serialize segments in this format
    pub fn write_segments(self, segments: &[Segment]) -> Result<String> {
        match self {
            FileFormat::Stm => StmAdapter.write_segments(segments),
            FileFormat::GreenKey => GreenKeyAdapter.write_segments(segments),
            FileFormat::Vtt => VttAdapter.write_segments(segments),
            FileFormat::Txt => TxtAdapter.write_segments(segments),
            other => Err(Error::InvalidInput(format!(
                "{} is a read-only format",
                other
            ))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    /// Accepts a format name, or the name without its `json-` prefix
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_lowercase();
        if wanted == "json" {
            return Ok(FileFormat::GreenKey);
        }
        FileFormat::ALL
            .into_iter()
            .find(|format| {
                let name = format.name();
                name == wanted || name.strip_prefix("json-") == Some(wanted.as_str())
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown transcript format: {}", wanted)))
    }
}

/// Render seconds the way STM and JSON writers expect (`0.0`, `1.5`)
pub fn format_seconds(seconds: f64) -> String {
    if seconds.fract() == 0.0 && seconds.abs() < 1e15 {
        format!("{:.1}", seconds)
    } else {
        seconds.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_names_round_trip() {
        for format in FileFormat::ALL {
            assert_eq!(format.name().parse::<FileFormat>().unwrap(), format);
        }
        assert_eq!("Rev".parse::<FileFormat>().unwrap(), FileFormat::Rev);
        assert_eq!("json".parse::<FileFormat>().unwrap(), FileFormat::GreenKey);
        assert!("docx".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_detect_json_shapes() {
        assert_eq!(
            FileFormat::detect_json(&json!({"results": {"items": []}})),
            FileFormat::Aws
        );
        assert_eq!(
            FileFormat::detect_json(&json!({"results": []})),
            FileFormat::Speechmatics
        );
        assert_eq!(
            FileFormat::detect_json(&json!({"monologues": []})),
            FileFormat::Rev
        );
        assert_eq!(
            FileFormat::detect_json(&json!({"segments": []})),
            FileFormat::GreenKey
        );
    }

    #[test]
    fn test_from_path() {
        assert_eq!(FileFormat::from_path(Path::new("a/b.STM")), Some(FileFormat::Stm));
        assert_eq!(FileFormat::from_path(Path::new("a/b.vtt")), Some(FileFormat::Vtt));
        assert_eq!(FileFormat::from_path(Path::new("a/b.json")), None);
        assert_eq!(FileFormat::from_path(Path::new("a/b.wav")), None);
    }

    #[test]
    fn test_read_only_formats_refuse_to_write() {
        let segs = vec![Segment::new(0.0, 1.0, "hi")];
        assert!(FileFormat::Aws.write_segments(&segs).is_err());
        assert!(FileFormat::Rev.write_segments(&segs).is_err());
        assert!(FileFormat::Stm.write_segments(&segs).is_ok());
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0.0");
        assert_eq!(format_seconds(1.5), "1.5");
        assert_eq!(format_seconds(12.0), "12.0");
        assert_eq!(format_seconds(3.25), "3.25");
    }
}
