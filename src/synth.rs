use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channels::{SensorMode, TEMPERATURE_COLUMN};
use crate::error::TableError;
use crate::table::Table;

/// A sinusoidal transient on the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Seconds from the start of the recording
    pub start: f64,
    pub duration: f64,
    pub frequency: f64,
    pub amplitude: f64,
}

/// Deterministic instrument-like recording: Gaussian noise on every axis,
/// optional bursts, a static gravity offset and a temperature ramp whose
/// drift is baked into the axes.
#[derive(Debug, Clone)]
pub struct SyntheticRecording {
    pub mode: SensorMode,
    pub seconds: f64,
    pub noise: f64,
    pub seed: u64,
    pub bursts: Vec<Burst>,
    pub gravity: Option<[f64; 3]>,
    /// (start, end, beta)
    pub temperature: Option<(f64, f64, f64)>,
    pub time_column: Option<&'static str>,
}

impl SyntheticRecording {
    pub fn new(mode: SensorMode) -> Self {
        Self {
            mode,
            seconds: 30.0,
            noise: 1e-4,
            seed: 7,
            bursts: Vec::new(),
            gravity: None,
            temperature: None,
            time_column: Some("Time"),
        }
    }

    pub fn seconds(mut self, seconds: f64) -> Self {
        self.seconds = seconds;
        self
    }

    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn burst(mut self, burst: Burst) -> Self {
        self.bursts.push(burst);
        self
    }

    pub fn gravity(mut self, g: [f64; 3]) -> Self {
        self.gravity = Some(g);
        self
    }

    pub fn temperature_ramp(mut self, start: f64, end: f64, beta: f64) -> Self {
        self.temperature = Some((start, end, beta));
        self
    }

    pub fn time_column(mut self, name: Option<&'static str>) -> Self {
        self.time_column = name;
        self
    }

    pub fn sample_count(&self) -> usize {
        (self.seconds * self.mode.sample_rate_hz() as f64).round().max(0.0) as usize
    }

    pub fn to_table(&self, name: impl Into<String>) -> Result<Table, TableError> {
        let fs = self.mode.sample_rate_hz() as f64;
        let n = self.sample_count();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut axes: [Vec<f64>; 3] = Default::default();
        for axis in axes.iter_mut() {
            *axis = (0..n).map(|_| gauss(&mut rng) * self.noise).collect();
        }

        for b in &self.bursts {
            for (i, v) in axes[2].iter_mut().enumerate() {
                let t = i as f64 / fs;
                if t >= b.start && t < b.start + b.duration {
                    *v += b.amplitude * (2.0 * PI * b.frequency * (t - b.start)).sin();
                }
            }
        }

        let temperature = self.temperature.map(|(start, end, beta)| {
            let ramp: Vec<f64> = (0..n)
                .map(|i| start + (end - start) * i as f64 / n.max(2).saturating_sub(1) as f64)
                .collect();
            let mean = ramp.iter().sum::<f64>() / n.max(1) as f64;
            for axis in axes.iter_mut() {
                for (v, t) in axis.iter_mut().zip(&ramp) {
                    *v += beta * (t - mean);
                }
            }
            ramp
        });

        let mut table = Table::new(name);
        if let Some(col) = self.time_column {
            table.push_column(col, (0..n).map(|i| format!("{:.4}", i as f64 / fs)).collect())?;
        }

        let g = self.gravity.unwrap_or([0.0; 3]);
        for (column, (axis, offset)) in self.mode.axis_columns().iter().zip(axes.iter().zip(g)) {
            let values: Vec<f64> = axis.iter().map(|v| v + offset).collect();
            table.push_numeric(*column, &values)?;
        }

        if self.mode == SensorMode::Fine {
            if let Some(g) = self.gravity {
                for (column, offset) in SensorMode::Coarse.axis_columns().iter().zip(g) {
                    let values: Vec<f64> = (0..n).map(|_| offset + gauss(&mut rng) * self.noise * 10.0).collect();
                    table.push_numeric(*column, &values)?;
                }
            }
        }

        if let Some(ramp) = temperature {
            table.push_numeric(TEMPERATURE_COLUMN, &ramp)?;
        }

        Ok(table)
    }
}

/// Standard normal draw (Box-Muller).
fn gauss(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fine_recording_columns() {
        let table = SyntheticRecording::new(SensorMode::Fine)
            .seconds(2.0)
            .gravity([0.0, 0.0, 9.81])
            .temperature_ramp(20.0, 25.0, 60e-6)
            .to_table("synthetic.csv")
            .unwrap();
        assert_eq!(table.len(), 400);
        assert_eq!(SensorMode::select(&table), Some(SensorMode::Fine));
        assert!(table.has_column("Z Coarse Acceleration"));
        assert!(table.has_column(TEMPERATURE_COLUMN));
        assert_eq!(table.text("Time").unwrap()[1], "0.0050");
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = SyntheticRecording::new(SensorMode::Coarse).seconds(1.0).to_table("a").unwrap();
        let b = SyntheticRecording::new(SensorMode::Coarse).seconds(1.0).to_table("b").unwrap();
        assert_eq!(a.numeric("X Coarse Acceleration"), b.numeric("X Coarse Acceleration"));
        let c = SyntheticRecording::new(SensorMode::Coarse).seconds(1.0).seed(8).to_table("c").unwrap();
        assert_ne!(a.numeric("X Coarse Acceleration"), c.numeric("X Coarse Acceleration"));
    }

    #[test]
    fn test_burst_lands_on_vertical_axis() {
        let table = SyntheticRecording::new(SensorMode::Fine)
            .seconds(3.0)
            .noise(0.0)
            .burst(Burst { start: 1.0, duration: 1.0, frequency: 10.0, amplitude: 0.5 })
            .to_table("b")
            .unwrap();
        let z = table.numeric("Z Fine Acceleration").unwrap();
        let x = table.numeric("X Fine Acceleration").unwrap();
        assert!(z[..200].iter().all(|&v| v == 0.0));
        assert!(z[200..400].iter().any(|&v| v.abs() > 0.4));
        assert!(x.iter().all(|&v| v == 0.0));
    }
}
