//! Randomized corpus splitting

use super::Corpus;
use asrkit_common::{Error, Result};
use rand::Rng;
use tracing::{debug, info};

impl Corpus {
    /// Carve a random split of at least `split_words` words and
    /// `min_segments` segments out of the valid exemplars
    ///
    /// Returns `(remaining, extracted)`. `extracted` has no location;
    /// `remaining` is this corpus minus `extracted` and keeps the location.
    /// Fails with [`Error::InvalidInput`] unless
    /// `0 <= split_words <= total valid words`; `self` is never modified.
    pub fn split(&self, split_words: i64, min_segments: usize) -> Result<(Corpus, Corpus)> {
        self.split_with_rng(split_words, min_segments, &mut rand::thread_rng())
    }

    /// [`Corpus::split`] with a caller-supplied random source
    pub fn split_with_rng<R: Rng + ?Sized>(
        &self,
        split_words: i64,
        min_segments: usize,
        rng: &mut R,
    ) -> Result<(Corpus, Corpus)> {
        let (mut pool, total_words) = self.clone().count_exemplar_words();

        let split_words = usize::try_from(split_words)
            .ok()
            .filter(|&words| words <= total_words)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "cannot split corpus with {} words into split with {} words",
                    total_words, split_words
                ))
            })?;

        let mut extracted = Vec::new();
        let (mut words, mut segments) = (0usize, 0usize);

        // Both thresholds must be strictly passed
        while words <= split_words || segments <= min_segments {
            if pool.is_empty() {
                debug!(words, segments, "Exemplar pool exhausted before thresholds were met");
                break;
            }
            let exemplar = pool.swap_remove(rng.gen_range(0..pool.len()));
            words += exemplar.n_words.unwrap_or_else(|| exemplar.count_words());
            segments += exemplar.transcript_file.segments.len();
            extracted.push(exemplar);
        }

        info!(
            exemplars = extracted.len(),
            words,
            segments,
            requested_words = split_words,
            "Extracted split"
        );

        let extracted = Corpus::from_exemplars(None, extracted);
        let mut remaining = self - &extracted;
        remaining.location = self.location.clone();

        Ok((remaining, extracted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FileFormat;
    use crate::models::{AudioFile, Exemplar, Segment, Transcript};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::Path;
    use tempfile::TempDir;

    fn corpus_of(dir: &Path, count: usize, words_per_segment: usize) -> Corpus {
        let text = vec!["word"; words_per_segment].join(" ");
        let exemplars = (0..count)
            .map(|i| {
                let audio = dir.join(format!("{}.wav", i));
                let stm = dir.join(format!("{}.stm", i));
                std::fs::write(&audio, format!("audio {}", i)).unwrap();
                Transcript::new(
                    vec![Segment::new(0.0, 1.0, text.as_str()), Segment::new(1.0, 2.0, text.as_str())],
                    FileFormat::Stm,
                )
                .write(&stm)
                .unwrap();
                Exemplar::new(AudioFile::new(audio), Transcript::from_file(stm).unwrap())
            })
            .collect();
        Corpus::from_exemplars(Some(dir.to_path_buf()), exemplars)
    }

    #[test]
    fn test_split_partitions_corpus() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = corpus_of(temp_dir.path(), 20, 3);
        let mut rng = StdRng::seed_from_u64(7);

        let (remaining, extracted) = corpus.split_with_rng(30, 4, &mut rng).unwrap();

        assert_eq!(remaining.len() + extracted.len(), corpus.len());
        assert!(extracted.iter().all(|eg| !remaining.exemplars.contains(eg)));
        assert!(extracted.n_words() > 30);
        assert!(extracted.calculate_number_of_segments() > 4);
        assert!(extracted.location.is_none());
        assert_eq!(remaining.location, corpus.location);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = corpus_of(temp_dir.path(), 3, 1);
        let total = corpus.n_words() as i64;

        assert!(matches!(corpus.split(-1, 10), Err(Error::InvalidInput(_))));
        assert!(matches!(corpus.split(total + 1, 10), Err(Error::InvalidInput(_))));
        assert_eq!(corpus.len(), 3);
        assert!(corpus.exemplars.iter().all(|eg| eg.n_words.is_none()));
    }

    #[test]
    fn test_exhausted_pool_takes_everything() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = corpus_of(temp_dir.path(), 3, 1);

        let (remaining, extracted) = corpus.split(0, 100).unwrap();
        assert_eq!(extracted.len(), 3);
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_same_seed_same_split() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = corpus_of(temp_dir.path(), 10, 2);

        let (_, first) = corpus.split_with_rng(5, 1, &mut StdRng::seed_from_u64(42)).unwrap();
        let (_, second) = corpus.split_with_rng(5, 1, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first.exemplars, second.exemplars);
    }
}
