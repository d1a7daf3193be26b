//! asrkit command-line interface
//!
//! ```bash
//! asrkit convert talk.json talk.stm
//! asrkit validate data/ --log data.json
//! asrkit split data/ out/ --split dev=5000 --split test=5000
//! asrkit prepare data/ out/ --sample-rate 8000 --nested
//! ```

use anyhow::{Context, Result};
use asrkit_common::AsrkitConfig;
use asrkit_corpus::services::{AudioPreparer, WavConverter};
use asrkit_corpus::{Corpus, CorpusLog, PrepareOptions, Transcript};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Split name for whatever is left after the named splits
const REMAINDER_SPLIT: &str = "train";

#[derive(Parser, Debug)]
#[command(name = "asrkit")]
#[command(about = "Normalize ASR transcripts and build training corpora")]
#[command(version)]
struct Cli {
    /// TOML config file (overrides ASRKIT_CONFIG)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides ASRKIT_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a transcript between formats, chosen by file extension
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Normalize text (lowercase, strip punctuation) before writing
        #[arg(long)]
        clean: bool,
    },
    /// Discover and deduplicate a corpus, then report valid exemplars
    Validate {
        dir: PathBuf,
        /// Write the corpus log as JSON
        #[arg(long, value_name = "FILE")]
        log: Option<PathBuf>,
    },
    /// Count valid exemplars, segments and words
    Count { dir: PathBuf },
    /// Carve named word-count splits out of a corpus and prepare each one
    Split {
        dir: PathBuf,
        target: PathBuf,
        /// NAME=WORDS, applied in order; may be repeated
        #[arg(long = "split", value_name = "NAME=WORDS", value_parser = parse_split, required = true)]
        splits: Vec<(String, i64)>,
        /// Minimum segments per split
        #[arg(long)]
        min_segments: Option<usize>,
        #[command(flatten)]
        prepare: PrepareArgs,
    },
    /// Convert a corpus to training-ready audio and STM
    Prepare {
        dir: PathBuf,
        target: PathBuf,
        #[command(flatten)]
        prepare: PrepareArgs,
    },
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// Output sample rate (Hz)
    #[arg(long)]
    sample_rate: Option<u32>,
    /// Write audio under sph/ and transcripts under stm/
    #[arg(long)]
    nested: bool,
    /// Concurrent conversions
    #[arg(long)]
    workers: Option<usize>,
}

impl PrepareArgs {
    fn resolve(&self, config: &AsrkitConfig) -> PrepareOptions {
        let mut options = PrepareOptions::from(config.corpus.clone());
        if let Some(sample_rate) = self.sample_rate {
            options.sample_rate = sample_rate;
        }
        if let Some(workers) = self.workers {
            options.workers = workers;
        }
        options.nested |= self.nested;
        options
    }
}

fn parse_split(arg: &str) -> std::result::Result<(String, i64), String> {
    let (name, words) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=WORDS, got {}", arg))?;
    if name.is_empty() {
        return Err(format!("empty split name in {}", arg));
    }
    let words = words
        .parse::<i64>()
        .map_err(|_| format!("word count is not an integer: {}", words))?;
    Ok((name.to_string(), words))
}

fn write_log(path: &Path, log: &CorpusLog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(log)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), exemplars = log.len(), "Wrote corpus log");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AsrkitConfig::load(cli.config.as_deref());
    let level = config.resolve_log_level(cli.log_level.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting asrkit v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Convert {
            input,
            output,
            clean,
        } => {
            let mut transcript = Transcript::from_file(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            if clean {
                transcript.clean_up();
            }
            transcript
                .write(&output)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} ({}) -> {}: {} segments",
                input.display(),
                transcript.format,
                output.display(),
                transcript.segments.len()
            );
        }

        Command::Validate { dir, log } => {
            let mut corpus = Corpus::new(&dir);
            let discovered = corpus.len();
            let valid = corpus.validate();
            println!(
                "{}: {} discovered, {} unique, {} valid",
                dir.display(),
                discovered,
                corpus.len(),
                valid
            );
            if let Some(path) = log {
                write_log(&path, &corpus.log()?)?;
            }
        }

        Command::Count { dir } => {
            let mut corpus = Corpus::new(&dir);
            corpus.validate();
            let (valid, words) = corpus.count_exemplar_words();
            let segments: usize = valid.iter().map(|eg| eg.transcript_file.segments.len()).sum();
            println!(
                "{}: {} valid exemplars, {} segments, {} words",
                dir.display(),
                valid.len(),
                segments,
                words
            );
        }

        Command::Split {
            dir,
            target,
            splits,
            min_segments,
            prepare,
        } => {
            let options = prepare.resolve(&config);
            let min_segments = min_segments.unwrap_or(config.corpus.min_segments);
            let preparer: Arc<dyn AudioPreparer> = Arc::new(WavConverter);

            let mut corpus = Corpus::new(&dir);
            corpus.validate();

            let mut named = Vec::with_capacity(splits.len() + 1);
            for (name, words) in splits {
                let (remaining, extracted) = corpus
                    .split(words, min_segments)
                    .with_context(|| format!("Failed to carve split {}", name))?;
                named.push((name, extracted));
                corpus = remaining;
            }
            named.push((REMAINDER_SPLIT.to_string(), corpus));

            for (name, split) in named {
                let split_dir = target.join(&name);
                let log = split
                    .prepare_for_training(Some(&split_dir), &options, Arc::clone(&preparer))
                    .await
                    .with_context(|| format!("Failed to prepare split {}", name))?;
                println!("{}: {} exemplars, {} words", name, log.len(), split.n_words());
                write_log(&target.join(format!("{}.json", name)), &log)?;
            }
        }

        Command::Prepare {
            dir,
            target,
            prepare,
        } => {
            let options = prepare.resolve(&config);
            let mut corpus = Corpus::new(&dir);
            corpus.validate();

            let prepared = corpus
                .prepare(Some(&target), &options, Arc::new(WavConverter))
                .await
                .with_context(|| format!("Failed to prepare {}", dir.display()))?;
            println!(
                "{} -> {}: {} of {} exemplars prepared",
                dir.display(),
                target.display(),
                prepared.len(),
                corpus.len()
            );
        }
    }

    Ok(())
}
