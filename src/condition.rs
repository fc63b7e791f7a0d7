use log::debug;

use crate::channels::{Axes, ChannelSet, SensorMode};
use crate::config::PipelineConfig;
use crate::util::{finite_mean, finite_median};

/// Subtract a linear temperature drift, one scalar term shared by all three axes.
pub fn correct_drift(axes: &mut Axes, temperature: &[f64], beta: f64) {
    let Some(mean) = finite_mean(temperature) else {
        debug!("Temperature column has no finite values, skipping drift correction");
        return;
    };
    for (i, &t) in temperature.iter().enumerate() {
        let drift = beta * (t - mean);
        for axis in [&mut axes.x, &mut axes.y, &mut axes.z] {
            if let Some(v) = axis.get_mut(i) {
                *v -= drift;
            }
        }
    }
}

/// Static gravity/tilt vector: per-axis median of the coarse reference.
pub fn tilt_vector(reference: &Axes) -> Option<[f64; 3]> {
    Some([
        finite_median(&reference.x)?,
        finite_median(&reference.y)?,
        finite_median(&reference.z)?,
    ])
}

pub fn remove_tilt(axes: &mut Axes, reference: &Axes) {
    let Some(g) = tilt_vector(reference) else {
        debug!("Coarse reference has no finite values, skipping tilt removal");
        return;
    };
    debug!("Removing tilt vector [{:.5}, {:.5}, {:.5}]", g[0], g[1], g[2]);
    for (axis, offset) in [&mut axes.x, &mut axes.y, &mut axes.z].into_iter().zip(g) {
        axis.iter_mut().for_each(|v| *v -= offset);
    }
}

/// Apply every correction the channel set has inputs for.
pub fn condition(channels: &ChannelSet, config: &PipelineConfig) -> Axes {
    let mut axes = channels.axes.clone();

    if let Some(temperature) = &channels.temperature {
        correct_drift(&mut axes, temperature, config.drift.beta);
    }

    if channels.mode == SensorMode::Fine {
        if let Some(reference) = &channels.coarse_reference {
            remove_tilt(&mut axes, reference);
        }
    }

    axes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes(x: &[f64], y: &[f64], z: &[f64]) -> Axes {
        Axes { x: x.to_vec(), y: y.to_vec(), z: z.to_vec() }
    }

    fn channel_set(mode: SensorMode, temperature: Option<Vec<f64>>, coarse: Option<Axes>) -> ChannelSet {
        ChannelSet {
            source_name: "t".into(),
            mode,
            time: vec!["0".into(), "1".into(), "2".into()],
            axes: axes(&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0], &[3.0, 3.0, 3.0]),
            temperature,
            coarse_reference: coarse,
        }
    }

    #[test]
    fn test_drift_is_shared_across_axes() {
        let mut a = axes(&[0.0; 3], &[1.0; 3], &[2.0; 3]);
        correct_drift(&mut a, &[10.0, 20.0, 30.0], 0.5);
        // mean 20 -> drift -5, 0, 5
        assert_eq!(a.x, vec![5.0, 0.0, -5.0]);
        assert_eq!(a.y, vec![6.0, 1.0, -4.0]);
        assert_eq!(a.z, vec![7.0, 2.0, -3.0]);
    }

    #[test]
    fn test_tilt_uses_median_not_mean() {
        let reference = axes(&[0.0, 0.0, 100.0], &[1.0, 1.0, 1.0], &[9.8, 9.7, 9.9]);
        let g = tilt_vector(&reference).unwrap();
        assert_eq!(g[0], 0.0, "outlier must not move the median");
        assert_eq!(g[1], 1.0);
        assert!((g[2] - 9.8).abs() < 1e-12);
    }

    #[test]
    fn test_condition_no_op_without_inputs() {
        let set = channel_set(SensorMode::Fine, None, None);
        assert_eq!(condition(&set, &PipelineConfig::default()), set.axes);
    }

    #[test]
    fn test_tilt_skipped_in_coarse_mode() {
        let reference = axes(&[1.0; 3], &[1.0; 3], &[1.0; 3]);
        let set = channel_set(SensorMode::Coarse, None, Some(reference));
        assert_eq!(condition(&set, &PipelineConfig::default()), set.axes);
    }

    #[test]
    fn test_tilt_applied_in_fine_mode() {
        let reference = axes(&[1.0; 3], &[2.0; 3], &[3.0; 3]);
        let set = channel_set(SensorMode::Fine, None, Some(reference));
        let out = condition(&set, &PipelineConfig::default());
        assert!(out.x.iter().chain(&out.y).chain(&out.z).all(|&v| v == 0.0));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_constant_temperature_leaves_axes() {
        let set = channel_set(SensorMode::Fine, Some(vec![21.5; 3]), None);
        assert_eq!(condition(&set, &PipelineConfig::default()), set.axes);
    }
}
