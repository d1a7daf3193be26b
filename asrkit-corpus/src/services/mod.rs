//! Collaborator services used by the models and the corpus engine

pub mod audio_preparer;
pub mod content_hasher;
pub mod name_cleaners;
pub mod text_cleanup;

pub use audio_preparer::{AudioPreparer, WavConverter};
pub use content_hasher::{hash_bytes, hash_file};
pub use name_cleaners::{base_name, sanitize};
pub use text_cleanup::clean_up;
