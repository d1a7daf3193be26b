//! Corpus engine
//!
//! A [`Corpus`] is an ordered collection of exemplars that is logically a set
//! keyed by audio content hash. Discovery builds one from a directory; the
//! operators `+`, `-` and slicing compose new corpora without touching their
//! operands. Only `+=`, `-=` and [`Corpus::validate`] mutate.

pub mod discovery;
pub mod prepare;
pub mod split;

pub use prepare::PrepareOptions;

use crate::models::Exemplar;
use asrkit_common::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::path::{Path, PathBuf};
use std::slice::SliceIndex;
use tracing::{debug, warn};

/// One line of the corpus log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub audio_file: PathBuf,
    pub audio_file_hash: String,
    pub transcript_file: Option<PathBuf>,
    pub transcript_file_hash: String,
}

/// Audio hash → file record for every exemplar
pub type CorpusLog = BTreeMap<String, LogEntry>;

/// Collection of audio/transcript exemplars
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Root directory, `None` for composed corpora
    pub location: Option<PathBuf>,
    pub exemplars: Vec<Exemplar>,
}

impl Corpus {
    /// Discover exemplars under `location`
    ///
    /// A missing directory yields an empty corpus. Nothing is validated here.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        let location = location.into();
        let exemplars = discovery::discover(&location);
        debug!(
            location = %location.display(),
            exemplars = exemplars.len(),
            "Discovered corpus"
        );
        Self {
            location: Some(location),
            exemplars,
        }
    }

    pub fn from_exemplars(location: Option<PathBuf>, exemplars: Vec<Exemplar>) -> Self {
        Self {
            location,
            exemplars,
        }
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn len(&self) -> usize {
        self.exemplars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exemplars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exemplar> {
        self.exemplars.iter()
    }

    /// Deduplicate by audio hash and count valid exemplars
    ///
    /// For repeated hashes the last exemplar seen replaces the earlier one,
    /// keeping the position of the first. Exemplars whose audio cannot be
    /// hashed are dropped. Running it twice gives the same result as once.
    pub fn validate(&mut self) -> usize {
        let mut kept: Vec<Exemplar> = Vec::with_capacity(self.exemplars.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for exemplar in std::mem::take(&mut self.exemplars) {
            let hash = match exemplar.hash() {
                Ok(hash) => hash.to_string(),
                Err(e) => {
                    warn!(
                        path = %exemplar.audio_file.location().display(),
                        error = %e,
                        "Dropping exemplar with unreadable audio"
                    );
                    continue;
                }
            };

            match positions.get(&hash) {
                Some(&index) => {
                    debug!(
                        kept = %exemplar.audio_file.location().display(),
                        replaced = %kept[index].audio_file.location().display(),
                        "Duplicate audio content"
                    );
                    kept[index] = exemplar;
                }
                None => {
                    positions.insert(hash, kept.len());
                    kept.push(exemplar);
                }
            }
        }

        self.exemplars = kept;
        self.exemplars.iter().filter(|eg| eg.validate()).count()
    }

    /// Cache word counts on valid exemplars
    ///
    /// Returns copies of the valid exemplars and their total word count.
    pub fn count_exemplar_words(&mut self) -> (Vec<Exemplar>, usize) {
        let mut valid = Vec::new();
        let mut total_words = 0;

        for exemplar in self.exemplars.iter_mut().filter(|eg| eg.validate()) {
            let n_words = exemplar.count_words();
            exemplar.n_words = Some(n_words);
            total_words += n_words;
            valid.push(exemplar.clone());
        }

        (valid, total_words)
    }

    /// Total words across valid exemplars
    pub fn n_words(&self) -> usize {
        self.exemplars
            .iter()
            .filter(|eg| eg.validate())
            .map(|eg| eg.n_words.unwrap_or_else(|| eg.count_words()))
            .sum()
    }

    pub fn calculate_number_of_segments(&self) -> usize {
        self.exemplars
            .iter()
            .map(|eg| eg.transcript_file.segments.len())
            .sum()
    }

    /// Record file locations and hashes, keyed by audio hash
    pub fn log(&self) -> Result<CorpusLog> {
        self.exemplars
            .iter()
            .map(|eg| {
                let audio_file_hash = eg.hash()?.to_string();
                let entry = LogEntry {
                    audio_file: eg.audio_file.location().to_path_buf(),
                    audio_file_hash: audio_file_hash.clone(),
                    transcript_file: eg.transcript_file.location.clone(),
                    transcript_file_hash: eg.transcript_file.hash()?,
                };
                Ok((audio_file_hash, entry))
            })
            .collect()
    }

    /// Single exemplar as a new corpus, keeping the location
    pub fn get(&self, index: usize) -> Option<Corpus> {
        self.slice(index..=index)
    }

    /// Sub-range as a new corpus, keeping the location
    pub fn slice<R>(&self, range: R) -> Option<Corpus>
    where
        R: SliceIndex<[Exemplar], Output = [Exemplar]>,
    {
        self.exemplars
            .get(range)
            .map(|exemplars| Corpus::from_exemplars(self.location.clone(), exemplars.to_vec()))
    }

    fn without(&self, other: &Corpus) -> Vec<Exemplar> {
        self.exemplars
            .iter()
            .filter(|eg| !other.exemplars.contains(eg))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Exemplar;
    type IntoIter = std::slice::Iter<'a, Exemplar>;

    fn into_iter(self) -> Self::IntoIter {
        self.exemplars.iter()
    }
}

/// Concatenation without deduplication; the result has no location
impl Add<&Corpus> for &Corpus {
    type Output = Corpus;

    fn add(self, other: &Corpus) -> Corpus {
        let mut exemplars = self.exemplars.clone();
        exemplars.extend(other.exemplars.iter().cloned());
        Corpus::from_exemplars(None, exemplars)
    }
}

impl Add for Corpus {
    type Output = Corpus;

    fn add(mut self, other: Corpus) -> Corpus {
        self.exemplars.extend(other.exemplars);
        self.location = None;
        self
    }
}

impl AddAssign<&Corpus> for Corpus {
    fn add_assign(&mut self, other: &Corpus) {
        self.exemplars.extend(other.exemplars.iter().cloned());
    }
}

impl AddAssign for Corpus {
    fn add_assign(&mut self, other: Corpus) {
        self.exemplars.extend(other.exemplars);
    }
}

/// Exemplars of the left operand not present (by audio hash) in the right;
/// the result has no location
impl Sub<&Corpus> for &Corpus {
    type Output = Corpus;

    fn sub(self, other: &Corpus) -> Corpus {
        Corpus::from_exemplars(None, self.without(other))
    }
}

impl Sub for Corpus {
    type Output = Corpus;

    fn sub(self, other: Corpus) -> Corpus {
        &self - &other
    }
}

impl SubAssign<&Corpus> for Corpus {
    fn sub_assign(&mut self, other: &Corpus) {
        self.exemplars = self.without(other);
    }
}

impl SubAssign for Corpus {
    fn sub_assign(&mut self, other: Corpus) {
        *self -= &other;
    }
}
