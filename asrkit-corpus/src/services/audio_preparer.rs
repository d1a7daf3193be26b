//! Audio preparation for training
//!
//! Converts a source recording into a mono 16-bit PCM WAV at the requested
//! sample rate. WAV and MP3 (and anything else symphonia probes) are decoded
//! with symphonia; NIST SPHERE files are read directly since symphonia has no
//! SPHERE demuxer.

use crate::models::AudioFile;
use asrkit_common::{Error, Result};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// Turns one audio asset into a training-ready copy
///
/// Implementations must be shareable across the preparation worker pool.
pub trait AudioPreparer: Send + Sync {
    /// Write a prepared copy of `source` to `destination` and return it
    fn prepare(&self, source: &AudioFile, destination: &Path, sample_rate: u32) -> Result<AudioFile>;
}

/// Decoded mono PCM
#[derive(Debug, Clone)]
pub struct MonoAudio {
    /// Samples normalized to -1.0..1.0
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Default preparer: decode, downmix to mono, resample, write 16-bit WAV
#[derive(Debug, Clone, Copy, Default)]
pub struct WavConverter;

impl AudioPreparer for WavConverter {
    fn prepare(&self, source: &AudioFile, destination: &Path, sample_rate: u32) -> Result<AudioFile> {
        if sample_rate == 0 {
            return Err(Error::InvalidInput("sample rate must be positive".to_string()));
        }

        let audio = decode(source.location())?;
        let samples = if audio.sample_rate == sample_rate {
            audio.samples
        } else {
            debug!(
                path = %source.location().display(),
                from = audio.sample_rate,
                to = sample_rate,
                "Resampling with rubato"
            );
            resample(audio.samples, audio.sample_rate, sample_rate)?
        };

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_wav(destination, &samples, sample_rate)?;

        Ok(AudioFile::new(destination))
    }
}

/// Decode any supported file to mono PCM
pub fn decode(path: &Path) -> Result<MonoAudio> {
    let is_sphere = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("sph"))
        .unwrap_or(false);

    if is_sphere {
        read_sphere(path)
    } else {
        decode_with_symphonia(path)
    }
}

fn audio_err(context: &str, path: &Path, e: impl std::fmt::Display) -> Error {
    Error::Audio(format!("{} {}: {}", context, path.display(), e))
}

fn decode_with_symphonia(path: &Path) -> Result<MonoAudio> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| audio_err("Failed to probe", path, e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Audio(format!("No audio track in {}", path.display())))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::Audio(format!("Sample rate not specified in {}", path.display())))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| audio_err("Failed to create decoder for", path, e))?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(audio_err("Failed to read packet from", path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frames are skipped rather than failing the file
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(path = %path.display(), error = %e, "Skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(audio_err("Failed to decode", path, e)),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);

        samples.extend(
            buffer
                .samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    debug!(path = %path.display(), frames = samples.len(), sample_rate, "Decoded audio");

    Ok(MonoAudio {
        samples,
        sample_rate,
    })
}

/// NIST SPHERE header fields needed to read the payload
#[derive(Debug, Clone, PartialEq)]
struct SphereHeader {
    header_size: usize,
    sample_rate: u32,
    channel_count: usize,
    sample_n_bytes: usize,
    coding: String,
    big_endian: bool,
}

fn parse_sphere_header(bytes: &[u8]) -> Result<SphereHeader> {
    let bad = |msg: &str| Error::Audio(format!("Invalid SPHERE header: {}", msg));

    let preamble = std::str::from_utf8(&bytes[..bytes.len().min(16)])
        .map_err(|_| bad("non-text preamble"))?;
    let mut lines = preamble.lines();
    if lines.next() != Some("NIST_1A") {
        return Err(bad("missing NIST_1A signature"));
    }
    let header_size: usize = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| bad("missing header size"))?;
    if header_size > bytes.len() {
        return Err(bad("header larger than file"));
    }

    let text = String::from_utf8_lossy(&bytes[..header_size]);
    let mut header = SphereHeader {
        header_size,
        sample_rate: 0,
        channel_count: 1,
        sample_n_bytes: 2,
        coding: "pcm".to_string(),
        big_endian: false,
    };

    for line in text.lines().skip(2) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.first() == Some(&"end_head") {
            break;
        }
        let [key, _kind, value, ..] = fields.as_slice() else {
            continue;
        };
        match *key {
            "sample_rate" => header.sample_rate = value.parse().map_err(|_| bad("sample_rate"))?,
            "channel_count" => header.channel_count = value.parse().map_err(|_| bad("channel_count"))?,
            "sample_n_bytes" => header.sample_n_bytes = value.parse().map_err(|_| bad("sample_n_bytes"))?,
            "sample_coding" => header.coding = value.to_lowercase(),
            "sample_byte_format" => header.big_endian = *value == "10",
            _ => {}
        }
    }

    if header.sample_rate == 0 {
        return Err(bad("missing sample_rate"));
    }
    if header.channel_count == 0 {
        return Err(bad("zero channels"));
    }
    Ok(header)
}

/// Expand one G.711 mu-law byte to linear PCM
fn ulaw_to_linear(byte: u8) -> i16 {
    let u = !byte;
    let exponent = (u >> 4) & 0x07;
    let mantissa = (u & 0x0F) as i32;
    let magnitude = (((mantissa << 3) + 0x84) << exponent) - 0x84;
    if u & 0x80 != 0 {
        -magnitude as i16
    } else {
        magnitude as i16
    }
}

fn read_sphere(path: &Path) -> Result<MonoAudio> {
    let bytes = std::fs::read(path)?;
    let header = parse_sphere_header(&bytes)?;
    let payload = &bytes[header.header_size..];

    let linear: Vec<i16> = match (header.coding.as_str(), header.sample_n_bytes) {
        (coding, 2) if coding.starts_with("pcm") => payload
            .chunks_exact(2)
            .map(|b| {
                if header.big_endian {
                    i16::from_be_bytes([b[0], b[1]])
                } else {
                    i16::from_le_bytes([b[0], b[1]])
                }
            })
            .collect(),
        (coding, 1) if coding.starts_with("ulaw") || coding.starts_with("mu-law") => {
            payload.iter().map(|&b| ulaw_to_linear(b)).collect()
        }
        (coding, width) => {
            return Err(Error::Audio(format!(
                "Unsupported SPHERE coding {} ({} bytes/sample) in {}",
                coding,
                width,
                path.display()
            )))
        }
    };

    let samples = linear
        .chunks(header.channel_count)
        .map(|frame| {
            frame.iter().map(|&s| s as f32 / 32768.0).sum::<f32>() / header.channel_count as f32
        })
        .collect();

    Ok(MonoAudio {
        samples,
        sample_rate: header.sample_rate,
    })
}

/// Resample mono PCM with a sinc interpolator
pub fn resample(samples: Vec<f32>, source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples);
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = target_rate as f64 / source_rate as f64;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|e| Error::Audio(format!("Failed to create resampler: {}", e)))?;

    let input_channels = vec![samples];
    let mut output = resampler
        .process(&input_channels, None)
        .map_err(|e| Error::Audio(format!("Resampling failed: {}", e)))?;

    Ok(output.pop().unwrap_or_default())
}

/// Write mono samples as 16-bit PCM WAV
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| audio_err("Failed to create", path, e))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| audio_err("Failed to write", path, e))?;
    }
    writer
        .finalize()
        .map_err(|e| audio_err("Failed to finalize", path, e))?;
    Ok(())
}
