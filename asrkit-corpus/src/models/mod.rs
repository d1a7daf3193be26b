//! Data model: segments, transcripts, audio files and exemplars

pub mod audio_file;
pub mod exemplar;
pub mod segment;
pub mod transcript;

pub use audio_file::AudioFile;
pub use exemplar::Exemplar;
pub use segment::{Segment, SegmentField, SegmentFields};
pub use transcript::Transcript;
