//! Corpus directory fixtures

use super::audio_generator::{generate_test_wav, AudioConfig};
use std::path::Path;

/// One STM line for `name` with the given timing and text
pub fn stm_line(name: &str, start: f64, stop: f64, text: &str) -> String {
    format!("{} 1 spk {:.1} {:.1} <o,f0,male> {}\n", name, start, stop, text)
}

/// `dir/<name>.wav` plus `dir/<name>.stm` with one line per text
pub fn write_exemplar(dir: &Path, name: &str, config: &AudioConfig, texts: &[&str]) -> anyhow::Result<()> {
    write_pair(dir, dir, name, config, texts)
}

/// `dir/sph/<name>.wav` plus `dir/stm/<name>.stm`
pub fn write_nested_exemplar(
    dir: &Path,
    name: &str,
    config: &AudioConfig,
    texts: &[&str],
) -> anyhow::Result<()> {
    write_pair(&dir.join("sph"), &dir.join("stm"), name, config, texts)
}

fn write_pair(
    audio_dir: &Path,
    stm_dir: &Path,
    name: &str,
    config: &AudioConfig,
    texts: &[&str],
) -> anyhow::Result<()> {
    std::fs::create_dir_all(audio_dir)?;
    std::fs::create_dir_all(stm_dir)?;
    generate_test_wav(&audio_dir.join(format!("{}.wav", name)), config)?;

    let stm: String = texts
        .iter()
        .enumerate()
        .map(|(i, text)| stm_line(name, i as f64, i as f64 + 1.0, text))
        .collect();
    std::fs::write(stm_dir.join(format!("{}.stm", name)), stm)?;
    Ok(())
}
