//! Concurrent training preparation
//!
//! Each exemplar is prepared on a bounded pool: at most `workers` blocking
//! conversions run at once and results are gathered in submission order.
//! A failing exemplar is logged and left out; the rest of the batch carries on.

use super::{Corpus, CorpusLog};
use crate::models::Exemplar;
use crate::services::audio_preparer::AudioPreparer;
use asrkit_common::{CorpusConfig, Error, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Settings for [`Corpus::prepare`]
#[derive(Debug, Clone, PartialEq)]
pub struct PrepareOptions {
    /// Output sample rate (Hz)
    pub sample_rate: u32,
    /// Use the `sph/` + `stm/` layout under the target
    pub nested: bool,
    /// Concurrent conversions
    pub workers: usize,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        CorpusConfig::default().into()
    }
}

impl From<CorpusConfig> for PrepareOptions {
    fn from(config: CorpusConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            nested: config.nested,
            workers: config.workers,
        }
    }
}

impl Corpus {
    /// Prepare every exemplar under `target` and return the validated result
    ///
    /// Without a target the corpus is rewritten at its own location.
    pub async fn prepare(
        &self,
        target: Option<&Path>,
        options: &PrepareOptions,
        preparer: Arc<dyn AudioPreparer>,
    ) -> Result<Corpus> {
        let target: PathBuf = target
            .or(self.location())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::InvalidInput("no target given and corpus has no location".to_string())
            })?;

        let total = self.len();
        let workers = options.workers.max(1);
        let done = Arc::new(AtomicUsize::new(0));

        info!(
            target = %target.display(),
            exemplars = total,
            workers,
            sample_rate = options.sample_rate,
            nested = options.nested,
            "Preparing corpus for training"
        );

        let prepared: Vec<Option<Exemplar>> = stream::iter(self.exemplars.iter().cloned())
            .map(|exemplar| {
                let target = target.clone();
                let options = options.clone();
                let preparer = Arc::clone(&preparer);
                let done = Arc::clone(&done);

                async move {
                    let source = exemplar.audio_file.location().to_path_buf();
                    let outcome = tokio::task::spawn_blocking(move || {
                        exemplar.prepare_for_training(
                            &target,
                            options.sample_rate,
                            options.nested,
                            preparer.as_ref(),
                        )
                    })
                    .await
                    .map_err(|e| Error::Internal(format!("preparation task failed: {}", e)))
                    .and_then(|result| result);

                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if current % 10 == 0 || current == total {
                        info!(progress = format!("{}/{}", current, total), "Preparation progress");
                    }

                    match outcome {
                        Ok(exemplar) => Some(exemplar),
                        Err(e) => {
                            warn!(path = %source.display(), error = %e, "Dropping exemplar that failed preparation");
                            None
                        }
                    }
                }
            })
            .buffered(workers)
            .collect()
            .await;

        let mut corpus = Corpus::from_exemplars(Some(target), prepared.into_iter().flatten().collect());
        let valid = corpus.validate();
        info!(prepared = corpus.len(), valid, dropped = total - corpus.len(), "Preparation complete");

        Ok(corpus)
    }

    /// Prepare under `target` and return the log of the prepared corpus
    pub async fn prepare_for_training(
        &self,
        target: Option<&Path>,
        options: &PrepareOptions,
        preparer: Arc<dyn AudioPreparer>,
    ) -> Result<CorpusLog> {
        self.prepare(target, options, preparer).await?.log()
    }
}
