//! Exemplar discovery
//!
//! Two layouts are searched under a corpus root:
//! - flat: `root/<base>.{mp3,wav,sph}` with `root/<base>.stm`
//! - nested: `root/sph/<base>.{mp3,wav,sph}` with `root/stm/<base>.stm`
//!
//! An exemplar is created only when both files exist. Discovery never
//! descends further and never validates.

use crate::models::exemplar::{NESTED_AUDIO_DIR, NESTED_TRANSCRIPT_DIR};
use crate::models::{AudioFile, Exemplar, Transcript};
use crate::services::name_cleaners::base_name;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Recognized audio extensions, in discovery order
pub const AUDIO_EXTENSIONS: [&str; 3] = ["mp3", "wav", "sph"];

/// Audio files directly inside `dir`, grouped by extension then sorted by path
pub fn audio_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut found: Vec<(usize, PathBuf)> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rank = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| AUDIO_EXTENSIONS.iter().position(|a| a.eq_ignore_ascii_case(ext)));
        if let Some(rank) = rank {
            found.push((rank, entry.into_path()));
        }
    }

    found.sort();
    found.into_iter().map(|(_, path)| path).collect()
}

/// Pair each audio file in `audio_dir` with `transcript_dir/<base>.stm`
fn pair(audio_dir: &Path, transcript_dir: &Path) -> Vec<Exemplar> {
    audio_files(audio_dir)
        .into_iter()
        .filter_map(|audio| {
            let stm = transcript_dir.join(format!("{}.stm", base_name(&audio)));
            if !stm.is_file() {
                debug!(audio = %audio.display(), "No matching transcript");
                return None;
            }

            match Transcript::from_file(&stm) {
                Ok(transcript) => Some(Exemplar::new(AudioFile::new(audio), transcript)),
                Err(e) => {
                    warn!(path = %stm.display(), error = %e, "Skipping unreadable transcript");
                    None
                }
            }
        })
        .collect()
}

/// Find every exemplar under `root` in both layouts
pub fn discover(root: &Path) -> Vec<Exemplar> {
    let mut exemplars = pair(root, root);
    exemplars.extend(pair(
        &root.join(NESTED_AUDIO_DIR),
        &root.join(NESTED_TRANSCRIPT_DIR),
    ));
    exemplars
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const STM_LINE: &str = "x 1 spk 0.0 1.0 <o,f0,male> words here\n";

    #[test]
    fn test_missing_root_is_empty() {
        assert!(discover(Path::new("/nonexistent/corpus")).is_empty());
    }

    #[test]
    fn test_flat_and_nested_layouts() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("sph")).unwrap();
        std::fs::create_dir_all(root.join("stm")).unwrap();

        std::fs::write(root.join("a.wav"), b"a").unwrap();
        std::fs::write(root.join("a.stm"), STM_LINE).unwrap();
        std::fs::write(root.join("orphan.mp3"), b"o").unwrap();
        std::fs::write(root.join("notes.txt"), b"n").unwrap();
        std::fs::write(root.join("sph").join("b.sph"), b"b").unwrap();
        std::fs::write(root.join("stm").join("b.stm"), STM_LINE).unwrap();
        std::fs::write(root.join("sph").join("c.wav"), b"c").unwrap();

        let exemplars = discover(root);
        let names: Vec<String> = exemplars.iter().map(Exemplar::base_name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(
            exemplars[1].transcript_file.location.as_deref(),
            Some(root.join("stm").join("b.stm").as_path())
        );
    }

    #[test]
    fn test_extension_order() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["z.mp3", "y.sph", "x.wav", "w.MP3"] {
            std::fs::write(temp_dir.path().join(name), b"_").unwrap();
        }
        let files: Vec<String> = audio_files(temp_dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["w.MP3", "z.mp3", "x.wav", "y.sph"]);
    }
}
