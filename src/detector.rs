use log::debug;

use crate::channels::Axes;
use crate::config::TriggerConfig;
use crate::util::{max_abs, seconds_to_samples};

/// A triggered span, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub start_index: usize,
    pub end_index: usize,
}

impl Candidate {
    pub fn midpoint(&self) -> usize {
        (self.start_index + self.end_index) / 2
    }
}

/// A candidate that survived the peak guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub candidate: Candidate,
    pub peak: f64,
}

/// STA and LTA lengths in samples. LTA is forced to at least twice STA when
/// the configured windows would not keep it longer.
pub fn window_lengths(config: &TriggerConfig, fs: f64) -> (usize, usize) {
    let sta = seconds_to_samples(config.sta_window, fs).max(1);
    let mut lta = seconds_to_samples(config.lta_window, fs);
    if lta <= sta {
        lta = sta * 2;
    }
    (sta, lta)
}

pub fn magnitude(axes: &Axes) -> Vec<f64> {
    axes.x
        .iter()
        .zip(&axes.y)
        .zip(&axes.z)
        .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
        .collect()
}

/// Causal trailing mean over `window` samples with zero initial state: the
/// sum is always divided by the full window, so the first `window - 1`
/// outputs ramp up from zero.
pub fn trailing_mean(signal: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let scale = 1.0 / window as f64;
    let mut out = Vec::with_capacity(signal.len());
    let mut sum = 0.0;
    for (i, &v) in signal.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= signal[i - window];
        }
        out.push(sum * scale);
    }
    out
}

/// Sample-wise STA/LTA; zero wherever LTA is not positive.
pub fn sta_lta_ratio(sta: &[f64], lta: &[f64]) -> Vec<f64> {
    sta.iter()
        .zip(lta)
        .map(|(&s, &l)| if l > 0.0 { s / l } else { 0.0 })
        .collect()
}

pub fn trigger_indices(ratio: &[f64], threshold: f64) -> Vec<usize> {
    ratio
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Split sorted trigger indices into runs wherever consecutive indices are
/// more than `gap` samples apart.
pub fn merge_runs(indices: &[usize], gap: f64) -> Vec<Candidate> {
    let mut runs = Vec::new();
    let Some(&first) = indices.first() else {
        return runs;
    };
    let mut current = Candidate { start_index: first, end_index: first };
    for &idx in &indices[1..] {
        if (idx - current.end_index) as f64 > gap {
            runs.push(current);
            current = Candidate { start_index: idx, end_index: idx };
        } else {
            current.end_index = idx;
        }
    }
    runs.push(current);
    runs
}

pub fn peak_in(vertical: &[f64], candidate: &Candidate) -> f64 {
    let end = (candidate.end_index + 1).min(vertical.len());
    let start = candidate.start_index.min(end);
    max_abs(&vertical[start..end])
}

/// Short-term/long-term energy-ratio trigger over the 3-axis magnitude.
pub struct Detector<'a> {
    config: &'a TriggerConfig,
    fs: f64,
}

impl<'a> Detector<'a> {
    pub fn new(config: &'a TriggerConfig, fs: f64) -> Self {
        Self { config, fs }
    }

    pub fn ratio(&self, filtered: &Axes) -> Vec<f64> {
        let (sta_n, lta_n) = window_lengths(self.config, self.fs);
        debug!("STA/LTA windows: {} / {} samples", sta_n, lta_n);
        let vec = magnitude(filtered);
        let sta = trailing_mean(&vec, sta_n);
        let lta = trailing_mean(&vec, lta_n);
        sta_lta_ratio(&sta, &lta)
    }

    /// Candidate runs before the peak guard, in index order.
    pub fn candidates(&self, filtered: &Axes) -> Vec<Candidate> {
        let ratio = self.ratio(filtered);
        let triggers = trigger_indices(&ratio, self.config.threshold);
        if triggers.is_empty() {
            return Vec::new();
        }
        let runs = merge_runs(&triggers, self.config.merge_gap * self.fs);
        debug!("{} trigger samples merged into {} runs", triggers.len(), runs.len());
        runs
    }

    /// Candidates whose vertical peak does not exceed the guard.
    pub fn detect(&self, filtered: &Axes) -> Vec<Detection> {
        self.candidates(filtered)
            .into_iter()
            .filter_map(|candidate| {
                let peak = peak_in(&filtered.z, &candidate);
                if peak > self.config.peak_guard {
                    debug!(
                        "Dropping run {}..={}: peak {:.4} above guard {}",
                        candidate.start_index, candidate.end_index, peak, self.config.peak_guard
                    );
                    None
                } else {
                    Some(Detection { candidate, peak })
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TriggerConfig {
        TriggerConfig::default()
    }

    #[test]
    fn test_window_lengths_default() {
        assert_eq!(window_lengths(&config(), 200.0), (100, 1000));
        assert_eq!(window_lengths(&config(), 90.0), (45, 450));
    }

    #[test]
    fn test_lta_forced_to_twice_sta() {
        for (sta, lta) in [(1.0, 1.0), (2.0, 0.5), (0.5, 0.0), (3.0, 2.9)] {
            let cfg = TriggerConfig { sta_window: sta, lta_window: lta, ..config() };
            for fs in [90.0, 200.0] {
                let (s, l) = window_lengths(&cfg, fs);
                assert!(l >= 2 * s, "sta={sta} lta={lta} fs={fs}: {s}/{l}");
            }
        }
    }

    #[test]
    fn test_trailing_mean_warm_up_and_steady_state() {
        let m = trailing_mean(&[2.0, 4.0, 6.0, 8.0], 2);
        assert_eq!(m, vec![1.0, 3.0, 5.0, 7.0]);
        let flat = trailing_mean(&[1.5; 10], 4);
        assert!((flat[0] - 0.375).abs() < 1e-12, "first output sees one sample of four");
        assert!(flat[3..].iter().all(|&v| (v - 1.5).abs() < 1e-12));
    }

    #[test]
    fn test_ratio_zero_where_lta_not_positive() {
        let sta = [1.0, 2.0, 3.0, 4.0];
        let lta = [0.0, -1.0, 2.0, -0.0];
        assert_eq!(sta_lta_ratio(&sta, &lta), vec![0.0, 0.0, 1.5, 0.0]);
    }

    #[test]
    fn test_merge_gap_boundary() {
        // gap exactly at the limit merges
        let runs = merge_runs(&[10, 20], 10.0);
        assert_eq!(runs, vec![Candidate { start_index: 10, end_index: 20 }]);
        // one more sample splits
        let runs = merge_runs(&[10, 21], 10.0);
        assert_eq!(
            runs,
            vec![
                Candidate { start_index: 10, end_index: 10 },
                Candidate { start_index: 21, end_index: 21 },
            ]
        );
    }

    #[test]
    fn test_merge_gap_in_seconds_at_fine_rate() {
        let gap = config().merge_gap * 200.0;
        let runs = merge_runs(&[0, 1, 2, 1002, 2003], gap);
        assert_eq!(
            runs,
            vec![
                Candidate { start_index: 0, end_index: 1002 },
                Candidate { start_index: 2003, end_index: 2003 },
            ]
        );
        assert!(merge_runs(&[], gap).is_empty());
    }

    #[test]
    fn test_candidate_midpoint() {
        assert_eq!(Candidate { start_index: 3, end_index: 8 }.midpoint(), 5);
    }

    #[test]
    fn test_silence_triggers_nothing() {
        let axes = Axes { x: vec![0.0; 3000], y: vec![0.0; 3000], z: vec![0.0; 3000] };
        let config = TriggerConfig::default();
        let detector = Detector::new(&config, 200.0);
        assert!(detector.ratio(&axes).iter().all(|&r| r == 0.0));
        assert!(detector.detect(&axes).is_empty());
    }

    fn step_axes(level: f64, burst: f64) -> Axes {
        let mut z = vec![level; 4000];
        z[2000..2200].iter_mut().for_each(|v| *v = burst);
        Axes { x: vec![0.0; 4000], y: vec![0.0; 4000], z }
    }

    #[test]
    fn test_startup_run_from_zero_state() {
        // constant magnitude: ratio is 10 until STA fills, then 1000 / (i + 1)
        let config = TriggerConfig::default();
        let detector = Detector::new(&config, 200.0);
        let axes = step_axes(0.001, 0.001);
        let ratio = detector.ratio(&axes);
        assert!((ratio[50] - 10.0).abs() < 1e-9, "ratio[50] = {}", ratio[50]);
        assert!((ratio[1999] - 1.0).abs() < 1e-9);
        let runs = detector.candidates(&axes);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start_index, 0);
        assert!((395..=400).contains(&runs[0].end_index), "end {}", runs[0].end_index);
    }

    #[test]
    fn test_late_burst_is_separate_from_startup_run() {
        let config = TriggerConfig::default();
        let detector = Detector::new(&config, 200.0);
        let found = detector.detect(&step_axes(0.001, 0.05));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].candidate.start_index, 0);
        let c = found[1].candidate;
        assert!(c.start_index >= 2000 && c.start_index < 2050, "start {}", c.start_index);
        assert!(c.end_index >= 2100 && c.end_index < 2400, "end {}", c.end_index);
        assert!((found[1].peak - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_peak_guard_drops_large_peaks() {
        let config = TriggerConfig::default();
        let detector = Detector::new(&config, 200.0);
        let axes = step_axes(0.01, 0.5);
        assert_eq!(detector.candidates(&axes).len(), 2);
        let kept = detector.detect(&axes);
        assert_eq!(kept.len(), 1, "peak above guard is discarded");
        assert_eq!(kept[0].candidate.start_index, 0);
    }

    #[test]
    fn test_peak_equal_to_guard_is_kept() {
        let cfg = TriggerConfig { peak_guard: 0.05, ..config() };
        let detector = Detector::new(&cfg, 200.0);
        assert_eq!(detector.detect(&step_axes(0.001, 0.05)).len(), 2);
    }
}
