//! Audio asset with lazily computed content identity

use crate::services::content_hasher::hash_file;
use asrkit_common::Result;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

/// One recording on disk
///
/// Identity is the SHA-256 of the file bytes, computed on first request and
/// memoized. Concurrent first access is safe; the cell never exposes a
/// partially written value.
#[derive(Debug, Clone)]
pub struct AudioFile {
    location: PathBuf,
    hash: OnceCell<String>,
}

impl AudioFile {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            hash: OnceCell::new(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn exists(&self) -> bool {
        self.location.is_file()
    }

    /// Hex SHA-256 of the file content
    pub fn hash(&self) -> Result<&str> {
        self.hash
            .get_or_try_init(|| hash_file(&self.location))
            .map(String::as_str)
    }
}
