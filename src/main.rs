use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::process;
use seismosonic::args::{Cli, Commands};
use seismosonic::channels::SensorMode;
use seismosonic::config::PipelineConfig;
use seismosonic::pipeline::{self, Outcome};
use seismosonic::synth::{Burst, SyntheticRecording};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("Error: {:#}", e);
        process::exit(1);
    }
}

fn default_config_path() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("org", "seismosonic", "seismosonic")?;
    let path = proj_dirs.config_dir().join("config.kdl");
    path.exists().then_some(path)
}

fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => {
            log::info!("Loading configuration from {}", path.display());
            PipelineConfig::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Detect { input, audio_dir, montage, json } => {
            let outcome = pipeline::process_csv(&input, &config);
            if let Outcome::Rejected(reason) = &outcome {
                println!("{}: no events ({})", input.display(), reason);
                return Ok(());
            }
            let events = outcome.into_events();

            if json {
                for event in &events {
                    println!("{}", serde_json::to_string(&event.summary())?);
                }
            } else if events.is_empty() {
                println!("{}: no events", input.display());
            } else {
                for (i, event) in events.iter().enumerate() {
                    println!(
                        "#{:<3} {} .. {}  peak {:.5}  [{} mode, {} ms audio]",
                        i, event.utc_start, event.utc_end, event.peak_magnitude,
                        event.sensor_mode, event.audio_clip.duration_ms()
                    );
                }
            }

            if let Some(dir) = audio_dir {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
                let stem = input
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "events".to_string());
                for (i, event) in events.iter().enumerate() {
                    event.audio_clip.write_wav(dir.join(format!("{}_event_{:03}.wav", stem, i)))?;
                }
            }

            if let Some(path) = montage {
                match pipeline::montage(&events, &config.audio) {
                    Some(clip) => clip.write_wav(&path)?,
                    None => log::warn!("No events, montage {} not written", path.display()),
                }
            }
        }
        Commands::Synth {
            output, coarse, seconds, burst_at, burst_duration,
            burst_amplitude, burst_frequency, noise, seed,
        } => {
            let mode = if coarse { SensorMode::Coarse } else { SensorMode::Fine };
            let mut recording = SyntheticRecording::new(mode).seconds(seconds).noise(noise).seed(seed);
            for start in burst_at {
                recording = recording.burst(Burst {
                    start,
                    duration: burst_duration,
                    frequency: burst_frequency,
                    amplitude: burst_amplitude,
                });
            }
            let name = output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let table = recording.to_table(name)?;
            let file = std::fs::File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            table.write_csv(file)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} rows ({} mode) to {}", table.len(), mode, output.display());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
