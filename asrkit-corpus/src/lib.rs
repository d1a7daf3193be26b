//! asrkit-corpus: transcript normalization and ASR training corpus tooling
//!
//! - [`formats`]: vendor transcript dialects mapped onto one canonical segment
//! - [`models`]: segments, transcripts, audio files and exemplars
//! - [`corpus`]: discovery, deduplication, splitting and preparation
//! - [`services`]: hashing, name and text cleanup, audio conversion

pub mod corpus;
pub mod formats;
pub mod models;
pub mod services;

pub use corpus::{Corpus, CorpusLog, LogEntry, PrepareOptions};
pub use formats::FileFormat;
pub use models::{AudioFile, Exemplar, Segment, Transcript};
