//! Time-aligned transcript
//!
//! A [`Transcript`] is an ordered list of segments plus the dialect it was
//! read from. Segment order is the source order; it is never re-sorted by
//! time.

use crate::formats::FileFormat;
use crate::models::Segment;
use crate::services::content_hasher::hash_bytes;
use crate::services::name_cleaners::base_name;
use crate::services::text_cleanup;
use asrkit_common::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Segments read from one transcript source
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// File the transcript was read from, `None` for in-memory payloads
    pub location: Option<PathBuf>,
    pub segments: Vec<Segment>,
    pub format: FileFormat,
}

/// Format for a target path; a bare `.json` is written as GreenKey
fn format_for_target(path: &Path) -> Result<FileFormat> {
    if let Some(format) = FileFormat::from_path(path) {
        return Ok(format);
    }
    if is_json_path(path) {
        return Ok(FileFormat::GreenKey);
    }
    Err(Error::InvalidInput(format!(
        "unrecognized transcript extension: {}",
        path.display()
    )))
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

impl Transcript {
    pub fn new(segments: Vec<Segment>, format: FileFormat) -> Self {
        Self {
            location: None,
            segments,
            format,
        }
    }

    /// Read a transcript, choosing the adapter from the extension
    ///
    /// A plain `.json` file is sniffed with [`FileFormat::detect_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(format!("transcript {}", path.display())));
        }
        let content = std::fs::read_to_string(path)?;

        let (format, segments) = match FileFormat::from_path(path) {
            Some(format) => (format, format.read_str(&content)?),
            None if is_json_path(path) => {
                let document: Value = serde_json::from_str(&content)?;
                let format = FileFormat::detect_json(&document);
                (format, format.read_json(&document)?)
            }
            None => {
                return Err(Error::InvalidInput(format!(
                    "unrecognized transcript extension: {}",
                    path.display()
                )))
            }
        };

        debug!(
            path = %path.display(),
            format = %format,
            segments = segments.len(),
            "Read transcript"
        );

        Ok(Self {
            location: Some(path.to_path_buf()),
            segments,
            format,
        })
    }

    /// Build from an in-memory JSON document of any supported vendor
    pub fn from_json(document: &Value) -> Result<Self> {
        let format = FileFormat::detect_json(document);
        Ok(Self::new(format.read_json(document)?, format))
    }

    /// Build from a raw payload in a known format
    pub fn from_text(payload: &str, format: FileFormat) -> Result<Self> {
        Ok(Self::new(format.read_str(payload)?, format))
    }

    pub fn exists(&self) -> bool {
        self.location.as_deref().map(Path::is_file).unwrap_or(false)
    }

    /// Base name of the source file, if any
    pub fn base_name(&self) -> Option<String> {
        self.location.as_deref().map(base_name)
    }

    /// Serialize in `format`, naming unnamed segments after `default_filename`
    pub fn to_format_string(&self, format: FileFormat, default_filename: Option<&str>) -> Result<String> {
        match default_filename {
            Some(name) => {
                let named: Vec<Segment> = self
                    .segments
                    .iter()
                    .map(|seg| Segment {
                        filename: seg.filename.clone().or_else(|| Some(name.to_string())),
                        ..seg.clone()
                    })
                    .collect();
                format.write_segments(&named)
            }
            None => format.write_segments(&self.segments),
        }
    }

    /// Write to `path` in the format its extension implies
    ///
    /// Segments without a filename take the target's base name.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = format_for_target(path)?;
        let content = self.to_format_string(format, Some(&base_name(path)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        debug!(path = %path.display(), format = %format, "Wrote transcript");
        Ok(())
    }

    /// SHA-256 of the serialized transcript
    ///
    /// Read-only dialects are hashed through their STM rendering.
    pub fn hash(&self) -> Result<String> {
        let format = if self.format.is_writable() {
            self.format
        } else {
            FileFormat::Stm
        };
        let name = self.base_name();
        let content = self.to_format_string(format, name.as_deref())?;
        Ok(hash_bytes(content.as_bytes()))
    }

    /// Normalize every segment's text
    pub fn clean_up(&mut self) {
        for seg in &mut self.segments {
            seg.text = text_cleanup::clean_up(&seg.text);
        }
    }

    /// Whitespace-delimited tokens across all segments
    pub fn count_words(&self) -> usize {
        self.segments.iter().map(Segment::word_count).sum()
    }

    pub fn has_valid_segment(&self) -> bool {
        self.segments.iter().any(Segment::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_json_is_sniffed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("call.json");
        std::fs::write(
            &path,
            r#"{"monologues": [{"speaker": 1, "elements": [
                {"type": "text", "value": "hi", "ts": 0.5, "end_ts": 0.9}
            ]}]}"#,
        )
        .unwrap();

        let transcript = Transcript::from_file(&path).unwrap();
        assert_eq!(transcript.format, FileFormat::Rev);
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.base_name().as_deref(), Some("call"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        assert!(matches!(
            Transcript::from_file("/nonexistent/talk.stm"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.doc");
        std::fs::write(&path, "words").unwrap();
        assert!(matches!(
            Transcript::from_file(&path),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_write_names_segments_after_target() {
        let temp_dir = TempDir::new().unwrap();
        let transcript = Transcript::from_json(&json!({"segments": [
            {"startTimeSec": 0.0, "endTimeSec": 1.5, "transcript": "Hello, World!"}
        ]}))
        .unwrap();

        let target = temp_dir.path().join("nested").join("talk.stm");
        transcript.write(&target).unwrap();

        let written = std::fs::read_to_string(&target).unwrap();
        assert_eq!(written, "talk 1 UnknownSpeaker 0.0 1.5 <o,f0,male> hello world\n");
    }

    #[test]
    fn test_order_survives_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let transcript = Transcript::new(
            vec![Segment::new(5.0, 6.0, "later"), Segment::new(0.0, 1.0, "earlier")],
            FileFormat::Stm,
        );
        let target = temp_dir.path().join("a.stm");
        transcript.write(&target).unwrap();

        let reread = Transcript::from_file(&target).unwrap();
        let texts: Vec<&str> = reread.segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["later", "earlier"]);
    }

    #[test]
    fn test_clean_up_and_count() {
        let mut transcript = Transcript::from_text("Hello,   there\nGood BYE.\n", FileFormat::Txt).unwrap();
        assert_eq!(transcript.count_words(), 4);
        transcript.clean_up();
        assert_eq!(transcript.segments[1].text, "good bye");
    }

    #[test]
    fn test_hash_tracks_content() {
        let a = Transcript::from_text("one line\n", FileFormat::Txt).unwrap();
        let b = Transcript::from_text("one line\n", FileFormat::Txt).unwrap();
        let c = Transcript::from_text("other line\n", FileFormat::Txt).unwrap();
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());
        assert_ne!(a.hash().unwrap(), c.hash().unwrap());
    }

    #[test]
    fn test_in_memory_transcript_does_not_exist() {
        let transcript = Transcript::from_text("x\n", FileFormat::Txt).unwrap();
        assert!(!transcript.exists());
        assert!(transcript.has_valid_segment());
    }
}
