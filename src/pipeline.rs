use std::path::Path;

use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::audio::{safe_append, to_audio, AudioClip};
use crate::channels::{read_axes, time_column, Axes, ChannelSet, SensorMode, TEMPERATURE_COLUMN};
use crate::condition::condition;
use crate::config::{AudioConfig, PipelineConfig};
use crate::detector::{Detection, Detector};
use crate::error::SonifyError;
use crate::event::{event_window, half_window, Event, Provenance};
use crate::filter::band_filter;
use crate::table::Table;

/// Why a dataset produced no events without being processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("input could not be read: {0}")]
    Unreadable(String),

    #[error("no Time or UTC column")]
    MissingTimeColumn,

    #[error("neither fine nor coarse acceleration trio present")]
    MissingAxes,
}

/// Result of processing one dataset. `Events` may be empty when nothing
/// triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Events(Vec<Event>),
    Rejected(Rejection),
}

impl Outcome {
    pub fn events(&self) -> &[Event] {
        match self {
            Outcome::Events(events) => events,
            Outcome::Rejected(_) => &[],
        }
    }

    /// Rejected input and "nothing detected" both collapse to an empty list.
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Outcome::Events(events) => events,
            Outcome::Rejected(_) => Vec::new(),
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Rejected(r) => Some(r),
            Outcome::Events(_) => None,
        }
    }
}

/// Pull the columns processing needs out of a table.
pub fn channel_set(table: &Table) -> Result<ChannelSet, Rejection> {
    let time = time_column(table).ok_or(Rejection::MissingTimeColumn)?.to_vec();
    let mode = SensorMode::select(table).ok_or(Rejection::MissingAxes)?;
    let axes = read_axes(table, mode).ok_or(Rejection::MissingAxes)?;
    let coarse_reference = match mode {
        SensorMode::Fine => read_axes(table, SensorMode::Coarse),
        SensorMode::Coarse => None,
    };
    Ok(ChannelSet {
        source_name: table.name().to_string(),
        mode,
        time,
        axes,
        temperature: table.numeric(TEMPERATURE_COLUMN),
        coarse_reference,
    })
}

pub fn filter_axes(axes: &Axes, fs: f64, config: &PipelineConfig) -> Axes {
    axes.map(|axis| band_filter(axis, fs, &config.filter))
}

pub fn process_csv<P: AsRef<Path>>(path: P, config: &PipelineConfig) -> Outcome {
    let path = path.as_ref();
    match Table::from_csv_path(path) {
        Ok(table) => process_table(&table, config),
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            Outcome::Rejected(Rejection::Unreadable(e.to_string()))
        }
    }
}

pub fn process_table(table: &Table, config: &PipelineConfig) -> Outcome {
    match channel_set(table) {
        Ok(channels) => Outcome::Events(process_channels(&channels, config)),
        Err(rejection) => {
            warn!("Rejected {}: {}", table.name(), rejection);
            Outcome::Rejected(rejection)
        }
    }
}

/// Condition, filter, detect, sonify and assemble, in run order.
pub fn process_channels(channels: &ChannelSet, config: &PipelineConfig) -> Vec<Event> {
    let fs = channels.sample_rate_hz() as f64;
    info!("Processing {} [{} mode, {} samples at {} Hz]", channels.source_name, channels.mode, channels.len(), fs);

    let conditioned = condition(channels, config);
    let filtered = filter_axes(&conditioned, fs, config);

    let detections = Detector::new(&config.trigger, fs).detect(&filtered);
    if detections.is_empty() {
        info!("No events in {}", channels.source_name);
        return Vec::new();
    }

    let half = half_window(config.event.duration, fs);
    let provenance = Provenance {
        source_name: &channels.source_name,
        sensor_mode: channels.mode,
        time: &channels.time,
        sample_rate_hz: channels.sample_rate_hz(),
    };

    let render = |d: &Detection| -> Option<Event> {
        let window = event_window(&d.candidate, half, filtered.z.len());
        let waveform = filtered.z[window].to_vec();
        match to_audio(&waveform, fs, &config.audio) {
            Ok(clip) => Some(provenance.assemble(&d.candidate, d.peak, waveform, clip)),
            Err(e) => {
                warn_dropped(d, e);
                None
            }
        }
    };

    let rendered: Vec<Option<Event>> = if config.general.parallel {
        run_parallel(config.general.threads, || detections.par_iter().map(render).collect())
    } else {
        detections.iter().map(render).collect()
    };
    let events: Vec<Event> = rendered.into_iter().flatten().collect();

    for event in &events {
        info!(
            "Event {} .. {} peak {:.5} ({} audio samples)",
            event.utc_start, event.utc_end, event.peak_magnitude, event.audio_clip.len()
        );
    }
    events
}

fn warn_dropped(d: &Detection, e: SonifyError) {
    warn!("Dropping run {}..={}: {}", d.candidate.start_index, d.candidate.end_index, e);
}

fn run_parallel<T: Send>(threads: usize, job: impl FnOnce() -> T + Send) -> T {
    if threads == 0 {
        return job();
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(job),
        Err(e) => {
            debug!("Could not build a {}-thread pool ({}), using the global pool", threads, e);
            job()
        }
    }
}

/// Join the clips of the `top` loudest events, kept in run order, with the
/// configured crossfade.
pub fn montage(events: &[Event], config: &AudioConfig) -> Option<AudioClip> {
    let mut ranked: Vec<usize> = (0..events.len()).collect();
    ranked.sort_by(|&a, &b| events[b].peak_magnitude.total_cmp(&events[a].peak_magnitude));
    ranked.truncate(config.montage_top);
    ranked.sort_unstable();

    ranked
        .into_iter()
        .map(|i| &events[i].audio_clip)
        .fold(None, |acc: Option<AudioClip>, clip| match acc {
            None => Some(clip.clone()),
            Some(joined) => Some(safe_append(&joined, clip, u64::from(config.crossfade_ms))),
        })
}
