use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::config::AudioConfig;
use crate::error::SonifyError;
use crate::resampler::{compressed_len, fourier_resample};
use crate::util::{lerp, linspace, max_abs};

/// 16-bit signed PCM, mono.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioClip {
    pub sample_rate: u32,
    #[serde(skip)]
    pub samples: Vec<i16>,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self { sample_rate, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whole milliseconds, rounded.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        ((self.samples.len() as f64 * 1000.0) / self.sample_rate as f64).round() as u64
    }

    fn ms_to_samples(&self, ms: u64) -> usize {
        (ms as f64 * self.sample_rate as f64 / 1000.0).round() as usize
    }

    /// Samples rescaled to [-1, 1].
    pub fn to_unit(&self) -> Vec<f64> {
        self.samples.iter().map(|&s| s as f64 / i16::MAX as f64).collect()
    }

    pub fn write_wav_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let num_channels = 1u16;
        let bits_per_sample = 16u16;
        let byte_rate = self.sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
        let block_align = num_channels * (bits_per_sample / 8);
        let data_size = self.samples.len() * 2;

        debug!("Writing WAV: channels={}, bits={}, rate={}, size={}", num_channels, bits_per_sample, self.sample_rate, data_size);

        out.write_all(b"RIFF")?;
        out.write_all(&((36 + data_size) as u32).to_le_bytes())?;
        out.write_all(b"WAVE")?;

        out.write_all(b"fmt ")?;
        out.write_all(&16u32.to_le_bytes())?;
        out.write_all(&1u16.to_le_bytes())?;
        out.write_all(&num_channels.to_le_bytes())?;
        out.write_all(&self.sample_rate.to_le_bytes())?;
        out.write_all(&byte_rate.to_le_bytes())?;
        out.write_all(&block_align.to_le_bytes())?;
        out.write_all(&bits_per_sample.to_le_bytes())?;

        out.write_all(b"data")?;
        out.write_all(&(data_size as u32).to_le_bytes())?;
        for &sample in &self.samples {
            out.write_all(&sample.to_le_bytes())?;
        }
        out.flush()
    }

    pub fn to_wav_bytes(&self) -> std::io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(44 + self.samples.len() * 2);
        self.write_wav_to(&mut buf).map(|()| buf)
    }

    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Saving audio to {}", path.display());
        let file = File::create(path)
            .with_context(|| format!("Failed to create audio file: {}", path.display()))?;
        self.write_wav_to(BufWriter::new(file))
            .with_context(|| format!("Failed to write audio file: {}", path.display()))
    }
}

/// Render a waveform slice as a time-compressed, peak-normalized PCM clip.
pub fn to_audio(slice: &[f64], source_rate: f64, config: &AudioConfig) -> Result<AudioClip, SonifyError> {
    if slice.is_empty() {
        return Err(SonifyError::Empty);
    }
    if slice.iter().all(|v| v.is_nan()) {
        return Err(SonifyError::AllUndefined);
    }
    let cleaned: Vec<f64> = slice.iter().map(|&v| if v.is_finite() { v } else { 0.0 }).collect();

    let num = compressed_len(cleaned.len(), source_rate, config.rate as f64, config.speedup);
    if num == 0 {
        return Err(SonifyError::TooShort);
    }
    let resampled = fourier_resample(&cleaned, num);

    let peak = max_abs(&resampled);
    if peak <= 0.0 || !peak.is_finite() {
        return Err(SonifyError::Silent);
    }
    let samples = resampled
        .iter()
        .map(|&v| (v / peak * i16::MAX as f64) as i16)
        .collect();
    Ok(AudioClip::new(samples, config.rate))
}

/// Crossfade actually used when joining `a` and `b`: the request clamped to
/// half the duration of each buffer.
pub fn crossfade_ms(a: &AudioClip, b: &AudioClip, requested_ms: u64) -> u64 {
    requested_ms.min(a.duration_ms() / 2).min(b.duration_ms() / 2)
}

/// Append `b` to `a`, blending the overlap with linear fades. The crossfade is
/// clamped so it never exceeds half of either buffer.
pub fn safe_append(a: &AudioClip, b: &AudioClip, requested_ms: u64) -> AudioClip {
    let cf = crossfade_ms(a, b, requested_ms);
    let overlap = a
        .ms_to_samples(cf)
        .min(a.samples.len())
        .min(b.samples.len());

    let head = a.samples.len() - overlap;
    let mut samples = Vec::with_capacity(head + b.samples.len());
    samples.extend_from_slice(&a.samples[..head]);

    let ramp = linspace(0.0, 1.0, overlap, false);
    for (i, gain_in) in ramp.into_iter().enumerate() {
        let out = lerp(a.samples[head + i] as f64, b.samples[i] as f64, gain_in);
        samples.push(out.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16);
    }
    samples.extend_from_slice(&b.samples[overlap..]);

    AudioClip::new(samples, a.sample_rate)
}
