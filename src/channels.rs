use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Table;

pub const TIME_COLUMNS: [&str; 2] = ["Time", "UTC"];
pub const TEMPERATURE_COLUMN: &str = "Temperature";

/// Instrument channel resolution. Each mode carries its own sample rate and
/// column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorMode {
    Fine,
    Coarse,
}

impl SensorMode {
    pub fn sample_rate_hz(self) -> u32 {
        match self {
            SensorMode::Fine => 200,
            SensorMode::Coarse => 90,
        }
    }

    pub fn axis_columns(self) -> [&'static str; 3] {
        match self {
            SensorMode::Fine => ["X Fine Acceleration", "Y Fine Acceleration", "Z Fine Acceleration"],
            SensorMode::Coarse => ["X Coarse Acceleration", "Y Coarse Acceleration", "Z Coarse Acceleration"],
        }
    }

    /// Fine wins whenever its full trio is present.
    pub fn select(table: &Table) -> Option<Self> {
        [SensorMode::Fine, SensorMode::Coarse]
            .into_iter()
            .find(|mode| mode.axis_columns().iter().all(|c| table.has_column(c)))
    }
}

impl fmt::Display for SensorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorMode::Fine => write!(f, "fine"),
            SensorMode::Coarse => write!(f, "coarse"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Axes {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    pub fn map(&self, mut f: impl FnMut(&[f64]) -> Vec<f64>) -> Axes {
        Axes { x: f(&self.x), y: f(&self.y), z: f(&self.z) }
    }
}

/// The columns one dataset contributes to processing.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    pub source_name: String,
    pub mode: SensorMode,
    pub time: Vec<String>,
    pub axes: Axes,
    pub temperature: Option<Vec<f64>>,
    /// Coarse trio, only collected in fine mode where it serves as tilt reference.
    pub coarse_reference: Option<Axes>,
}

impl ChannelSet {
    pub fn sample_rate_hz(&self) -> u32 {
        self.mode.sample_rate_hz()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

pub fn time_column(table: &Table) -> Option<&[String]> {
    TIME_COLUMNS.iter().find_map(|name| table.text(name))
}

pub fn read_axes(table: &Table, mode: SensorMode) -> Option<Axes> {
    let [x, y, z] = mode.axis_columns();
    Some(Axes {
        x: table.numeric(x)?,
        y: table.numeric(y)?,
        z: table.numeric(z)?,
    })
}
