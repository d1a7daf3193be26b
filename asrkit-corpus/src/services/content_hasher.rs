//! Content hashing for deduplication
//!
//! Exemplars are identified by the SHA-256 of their audio bytes, so the same
//! recording copied under two names collapses to one entry.

use asrkit_common::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Calculate the SHA-256 of a file, hex-encoded
///
/// Reads in 1MB chunks so large recordings are never held in memory.
pub fn hash_file(path: &Path) -> Result<String> {
    tracing::debug!(path = %path.display(), "Calculating SHA-256 hash");

    let mut file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {} for hashing: {}", path.display(), e),
        ))
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read {} for hashing: {}", path.display(), e),
            ))
        })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-256 of an in-memory buffer, hex-encoded
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
