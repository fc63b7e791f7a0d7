use serde::Serialize;

use crate::audio::AudioClip;
use crate::channels::SensorMode;
use crate::detector::Candidate;

/// One detected transient. Self-contained: nothing points back at the
/// dataset it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub source_name: String,
    pub sensor_mode: SensorMode,
    pub utc_start: String,
    pub utc_end: String,
    pub peak_magnitude: f64,
    /// Filtered vertical axis over the event window.
    pub waveform: Vec<f64>,
    pub audio_clip: AudioClip,
    /// Detection rate, not the audio rate.
    pub sample_rate_hz: u32,
}

/// Serializable view of an [`Event`] without the sample buffers.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary<'a> {
    pub source_name: &'a str,
    pub sensor_mode: SensorMode,
    pub utc_start: &'a str,
    pub utc_end: &'a str,
    pub peak_magnitude: f64,
    pub waveform_samples: usize,
    pub sample_rate_hz: u32,
    pub audio_samples: usize,
    pub audio_rate_hz: u32,
    pub audio_ms: u64,
}

impl Event {
    pub fn summary(&self) -> EventSummary<'_> {
        EventSummary {
            source_name: &self.source_name,
            sensor_mode: self.sensor_mode,
            utc_start: &self.utc_start,
            utc_end: &self.utc_end,
            peak_magnitude: self.peak_magnitude,
            waveform_samples: self.waveform.len(),
            sample_rate_hz: self.sample_rate_hz,
            audio_samples: self.audio_clip.len(),
            audio_rate_hz: self.audio_clip.sample_rate,
            audio_ms: self.audio_clip.duration_ms(),
        }
    }
}

/// Half-window in samples for an event of `duration` seconds, truncated.
pub fn half_window(duration: f64, fs: f64) -> usize {
    (duration * fs / 2.0).max(0.0) as usize
}

/// `[mid - half, mid + half)` around the candidate midpoint, clipped to `len`.
pub fn event_window(candidate: &Candidate, half: usize, len: usize) -> std::ops::Range<usize> {
    let mid = candidate.midpoint();
    let start = mid.saturating_sub(half).min(len);
    let end = (mid + half).min(len);
    start..end
}

/// Everything the assembler needs beyond the per-candidate values.
pub struct Provenance<'a> {
    pub source_name: &'a str,
    pub sensor_mode: SensorMode,
    pub time: &'a [String],
    pub sample_rate_hz: u32,
}

impl Provenance<'_> {
    pub fn assemble(&self, candidate: &Candidate, peak: f64, waveform: Vec<f64>, audio_clip: AudioClip) -> Event {
        let stamp = |i: usize| self.time.get(i).cloned().unwrap_or_default();
        Event {
            source_name: self.source_name.to_string(),
            sensor_mode: self.sensor_mode,
            utc_start: stamp(candidate.start_index),
            utc_end: stamp(candidate.end_index),
            peak_magnitude: peak,
            waveform,
            audio_clip,
            sample_rate_hz: self.sample_rate_hz,
        }
    }
}
