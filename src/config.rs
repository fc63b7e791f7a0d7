use knuffel::Decode;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of every tunable the pipeline reads.
///
/// Each component receives it by reference; a run is reproducible from the
/// snapshot alone.
#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[knuffel(child, default)]
    pub filter: FilterConfig,
    #[knuffel(child, default)]
    pub trigger: TriggerConfig,
    #[knuffel(child, default)]
    pub audio: AudioConfig,
    #[knuffel(child, default)]
    pub event: EventConfig,
    #[knuffel(child, default)]
    pub drift: DriftConfig,
    #[knuffel(child, default)]
    pub general: GeneralConfig,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Hz
    #[knuffel(property, default = 2.0)]
    pub low_cut: f64,
    /// Hz
    #[knuffel(property, default = 60.0)]
    pub high_cut: f64,
    #[knuffel(property, default = 4)]
    pub order: usize,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// STA window, seconds
    #[knuffel(property, default = 0.5)]
    pub sta_window: f64,
    /// LTA window, seconds
    #[knuffel(property, default = 5.0)]
    pub lta_window: f64,
    #[knuffel(property, default = 2.5)]
    pub threshold: f64,
    /// Seconds between trigger samples that still belong to one run
    #[knuffel(property, default = 5.0)]
    pub merge_gap: f64,
    /// Candidates whose vertical peak exceeds this are dropped
    #[knuffel(property, default = 0.1)]
    pub peak_guard: f64,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    #[knuffel(property, default = 44_100)]
    pub rate: u32,
    #[knuffel(property, default = 50.0)]
    pub speedup: f64,
    #[knuffel(property, default = 50)]
    pub crossfade_ms: u32,
    #[knuffel(property, default = 5)]
    pub montage_top: usize,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Full window length in seconds before time compression
    #[knuffel(property, default = 4.0)]
    pub duration: f64,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Acceleration units per kelvin
    #[knuffel(property, default = 60e-6)]
    pub beta: f64,
}

#[derive(Decode, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[knuffel(property, default = true)]
    pub parallel: bool,
    /// 0 lets rayon pick
    #[knuffel(property, default = 0)]
    pub threads: usize,
}

impl PipelineConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config = knuffel::parse("config.kdl", content)?;
        Ok(config)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { low_cut: 2.0, high_cut: 60.0, order: 4 }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            sta_window: 0.5,
            lta_window: 5.0,
            threshold: 2.5,
            merge_gap: 5.0,
            peak_guard: 0.1,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { rate: 44_100, speedup: 50.0, crossfade_ms: 50, montage_top: 5 }
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self { duration: 4.0 }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self { beta: 60e-6 }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { parallel: true, threads: 0 }
    }
}
