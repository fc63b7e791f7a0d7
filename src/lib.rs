pub mod args;
pub mod audio;
pub mod channels;
pub mod condition;
pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod filter;
pub mod pipeline;
pub mod resampler;
pub mod synth;
pub mod table;
pub mod util;

pub use audio::AudioClip;
pub use channels::SensorMode;
pub use config::PipelineConfig;
pub use event::Event;
pub use pipeline::{process_csv, process_table, Outcome, Rejection};
pub use table::Table;
