use std::path::PathBuf;

use crate::util::positive_parser;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finds ground-motion transients in accelerometer logs and renders them as audio.")]
pub struct Cli {
    /// KDL configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect events in one CSV recording
    Detect {
        input: PathBuf,
        /// Write each event clip as a WAV file into this directory
        #[arg(long)]
        audio_dir: Option<PathBuf>,
        /// Write the loudest event clips joined with crossfades
        #[arg(long)]
        montage: Option<PathBuf>,
        /// Print event summaries as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Write a synthetic recording to CSV
    Synth {
        output: PathBuf,
        #[arg(long)]
        coarse: bool,
        #[arg(long, default_value_t = 60.0, value_parser = positive_parser)]
        seconds: f64,
        /// Burst start time in seconds, repeatable
        #[arg(long = "burst-at")]
        burst_at: Vec<f64>,
        #[arg(long, default_value_t = 1.0, value_parser = positive_parser)]
        burst_duration: f64,
        #[arg(long, default_value_t = 0.02)]
        burst_amplitude: f64,
        #[arg(long, default_value_t = 10.0, value_parser = positive_parser)]
        burst_frequency: f64,
        #[arg(long, default_value_t = 1e-4)]
        noise: f64,
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Print the effective configuration as JSON
    Config,
}
