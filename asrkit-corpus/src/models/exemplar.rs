//! Audio/transcript pair

use crate::models::{AudioFile, Transcript};
use crate::services::audio_preparer::AudioPreparer;
use crate::services::name_cleaners::base_name;
use asrkit_common::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory for audio in the nested corpus layout
pub const NESTED_AUDIO_DIR: &str = "sph";

/// Subdirectory for transcripts in the nested corpus layout
pub const NESTED_TRANSCRIPT_DIR: &str = "stm";

/// One recording and its reference transcript
///
/// Two exemplars are the same entity iff their audio content hashes match.
/// The transcript never participates in identity.
#[derive(Debug, Clone)]
pub struct Exemplar {
    pub audio_file: AudioFile,
    pub transcript_file: Transcript,
    /// Cached word count, filled by the corpus word counter
    pub n_words: Option<usize>,
}

impl Exemplar {
    pub fn new(audio_file: AudioFile, transcript_file: Transcript) -> Self {
        Self {
            audio_file,
            transcript_file,
            n_words: None,
        }
    }

    /// Both files exist and the transcript has at least one valid segment
    pub fn validate(&self) -> bool {
        self.audio_file.exists()
            && self.transcript_file.exists()
            && self.transcript_file.has_valid_segment()
    }

    pub fn count_words(&self) -> usize {
        self.transcript_file.count_words()
    }

    /// Identity key: the audio content hash
    pub fn hash(&self) -> Result<&str> {
        self.audio_file.hash()
    }

    /// Base name shared by the audio and transcript files
    pub fn base_name(&self) -> String {
        base_name(self.audio_file.location())
    }

    /// Write a training-ready copy under `target`
    ///
    /// Audio goes to `<base>.wav` and the transcript to `<base>.stm`, either
    /// both directly under `target` or, with `nested`, under `target/sph` and
    /// `target/stm`. Every segment is renamed to `<base>`. The returned
    /// transcript is the one re-read from the written file.
    pub fn prepare_for_training(
        &self,
        target: &Path,
        sample_rate: u32,
        nested: bool,
        preparer: &dyn AudioPreparer,
    ) -> Result<Exemplar> {
        let base = self.base_name();
        let (audio_dir, transcript_dir) = layout_dirs(target, nested);

        std::fs::create_dir_all(&audio_dir)?;
        std::fs::create_dir_all(&transcript_dir)?;

        let audio_target = audio_dir.join(format!("{}.wav", base));
        let audio_file = preparer.prepare(&self.audio_file, &audio_target, sample_rate)?;

        let transcript_target = transcript_dir.join(format!("{}.stm", base));
        let mut transcript_file = self.transcript_file.clone();
        for seg in &mut transcript_file.segments {
            seg.filename = Some(base.clone());
        }
        transcript_file.write(&transcript_target)?;
        let transcript_file = Transcript::from_file(&transcript_target)?;

        debug!(
            audio = %audio_file.location().display(),
            sample_rate,
            "Prepared exemplar"
        );

        Ok(Exemplar::new(audio_file, transcript_file))
    }
}

/// Audio and transcript directories for a prepared corpus
pub fn layout_dirs(target: &Path, nested: bool) -> (PathBuf, PathBuf) {
    if nested {
        (target.join(NESTED_AUDIO_DIR), target.join(NESTED_TRANSCRIPT_DIR))
    } else {
        (target.to_path_buf(), target.to_path_buf())
    }
}

impl PartialEq for Exemplar {
    /// Audio hashes decide; unreadable audio falls back to path equality
    fn eq(&self, other: &Self) -> bool {
        match (self.audio_file.hash(), other.audio_file.hash()) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.audio_file.location() == other.audio_file.location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FileFormat;
    use crate::models::Segment;
    use tempfile::TempDir;

    /// Copies bytes verbatim instead of transcoding
    struct CopyPreparer;

    impl AudioPreparer for CopyPreparer {
        fn prepare(&self, source: &AudioFile, destination: &Path, _sample_rate: u32) -> Result<AudioFile> {
            std::fs::copy(source.location(), destination)?;
            Ok(AudioFile::new(destination))
        }
    }

    fn exemplar_in(dir: &Path, name: &str, audio: &[u8], text: &str) -> Exemplar {
        let audio_path = dir.join(format!("{}.wav", name));
        let stm_path = dir.join(format!("{}.stm", name));
        std::fs::write(&audio_path, audio).unwrap();
        std::fs::write(&stm_path, format!("{} 1 spk 0.0 1.0 <o,f0,male> {}\n", name, text)).unwrap();
        Exemplar::new(AudioFile::new(audio_path), Transcript::from_file(stm_path).unwrap())
    }

    #[test]
    fn test_equality_ignores_transcript() {
        let temp_dir = TempDir::new().unwrap();
        let a = exemplar_in(temp_dir.path(), "a", b"audio", "one");
        let b = exemplar_in(temp_dir.path(), "b", b"audio", "two words");
        let c = exemplar_in(temp_dir.path(), "c", b"other", "one");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_validate_requires_files_and_segments() {
        let temp_dir = TempDir::new().unwrap();
        let valid = exemplar_in(temp_dir.path(), "a", b"audio", "hello there");
        assert!(valid.validate());
        assert_eq!(valid.count_words(), 2);

        let in_memory = Exemplar::new(
            valid.audio_file.clone(),
            Transcript::new(vec![Segment::new(0.0, 1.0, "x")], FileFormat::Stm),
        );
        assert!(!in_memory.validate());

        std::fs::remove_file(valid.audio_file.location()).unwrap();
        assert!(!valid.validate());
    }

    #[test]
    fn test_prepare_nested_layout() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let exemplar = exemplar_in(source_dir.path(), "call", b"audio", "hello");

        let prepared = exemplar
            .prepare_for_training(target_dir.path(), 16000, true, &CopyPreparer)
            .unwrap();

        assert_eq!(
            prepared.audio_file.location(),
            target_dir.path().join("sph").join("call.wav")
        );
        let stm = target_dir.path().join("stm").join("call.stm");
        assert!(stm.is_file());
        assert!(prepared.validate());
        assert_eq!(prepared, exemplar);
        assert!(prepared
            .transcript_file
            .segments
            .iter()
            .all(|s| s.filename.as_deref() == Some("call")));
    }

    #[test]
    fn test_prepare_flat_layout() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let exemplar = exemplar_in(source_dir.path(), "call", b"audio", "hello");

        exemplar
            .prepare_for_training(target_dir.path(), 16000, false, &CopyPreparer)
            .unwrap();

        assert!(target_dir.path().join("call.wav").is_file());
        assert!(target_dir.path().join("call.stm").is_file());
    }

    #[test]
    fn test_prepared_transcript_matches_written_file() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let audio_path = source_dir.path().join("call.wav");
        std::fs::write(&audio_path, b"audio").unwrap();
        let exemplar = Exemplar::new(
            AudioFile::new(&audio_path),
            Transcript::new(
                vec![Segment::new(0.0, 1.0, "?!"), Segment::new(1.0, 2.0, "A.B.C. -- Hi")],
                FileFormat::Stm,
            ),
        );

        let prepared = exemplar
            .prepare_for_training(target_dir.path(), 16000, false, &CopyPreparer)
            .unwrap();

        let on_disk = Transcript::from_file(target_dir.path().join("call.stm")).unwrap();
        assert_eq!(prepared.transcript_file.segments, on_disk.segments);
        assert_eq!(prepared.transcript_file.segments.len(), 1);
        assert_eq!(prepared.count_words(), on_disk.count_words());
    }

    #[test]
    fn test_prepare_punctuation_only_transcript_is_invalid() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let exemplar = exemplar_in(source_dir.path(), "call", b"audio", "?!");
        assert!(exemplar.validate());

        let prepared = exemplar
            .prepare_for_training(target_dir.path(), 16000, false, &CopyPreparer)
            .unwrap();

        assert!(prepared.transcript_file.segments.is_empty());
        assert!(!prepared.validate());
    }
}
