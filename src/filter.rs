use std::f64::consts::PI;

use anyhow::{anyhow, Result};
use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};
use log::debug;

use crate::config::FilterConfig;

/// Effective pass band after clamping the configured edges into the valid
/// range for `fs`. `None` means filtering is skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassBand {
    pub low: f64,
    pub high: f64,
}

impl PassBand {
    pub fn clamp(config: &FilterConfig, fs: f64) -> Option<Self> {
        let nyq = fs / 2.0;
        let high = config.high_cut.min(nyq * 0.9);
        let low = config.low_cut.min(high * 0.8);
        if high <= 0.0 || low >= nyq || !high.is_finite() || !low.is_finite() {
            return None;
        }
        Some(Self { low, high })
    }
}

pub fn dc_gain(c: &Coefficients<f64>) -> f64 {
    (c.b0 + c.b1 + c.b2) / (1.0 + c.a1 + c.a2)
}

/// One pass that starts from the steady state for a constant input equal to
/// the first sample, so a DC offset does not ring at the start.
fn steady_state_pass<F: Biquad<f64>>(signal: &mut [f64], filter: &mut F, gain: f64) {
    let Some(&c) = signal.first() else { return };
    signal.iter_mut().for_each(|x| *x = filter.run(*x - c) + c * gain);
    filter.reset_state();
}

pub fn forward_backward_filter<F: Biquad<f64>>(signal: &mut [f64], filter: &mut F, gain: f64) {
    steady_state_pass(signal, filter, gain);
    signal.reverse();
    steady_state_pass(signal, filter, gain);
    signal.reverse();
}

pub fn make_coefficients(f_type: Type<f64>, fs: f64, freq: f64, q: f64) -> Result<Coefficients<f64>> {
    Coefficients::<f64>::from_params(f_type, fs.hz(), freq.hz(), q).map_err(|_| anyhow!("Failed to create filter coefficients"))
}

/// Q of each conjugate pole pair of an analog Butterworth prototype.
pub fn butterworth_qs(order: usize) -> Vec<f64> {
    (0..order / 2)
        .map(|k| {
            let angle = PI * (order - 1 - 2 * k) as f64 / (2 * order) as f64;
            1.0 / (2.0 * angle.cos())
        })
        .collect()
}

/// First-order section from the bilinear transform, prewarped at `freq`.
fn first_order(high_pass: bool, fs: f64, freq: f64) -> Coefficients<f64> {
    let k = (PI * freq / fs).tan();
    let norm = 1.0 / (1.0 + k);
    let (b0, b1) = if high_pass { (norm, -norm) } else { (k * norm, k * norm) };
    Coefficients { a1: (k - 1.0) * norm, a2: 0.0, b0, b1, b2: 0.0 }
}

fn butterworth_sections(high_pass: bool, fs: f64, freq: f64, order: usize) -> Result<Vec<Coefficients<f64>>> {
    let mut sections = butterworth_qs(order)
        .into_iter()
        .map(|q| {
            let f_type = if high_pass { Type::HighPass } else { Type::LowPass };
            make_coefficients(f_type, fs, freq, q)
        })
        .collect::<Result<Vec<_>>>()?;
    if order % 2 == 1 {
        sections.push(first_order(high_pass, fs, freq));
    }
    Ok(sections)
}

/// Butterworth band-pass: a high-pass cascade at the low edge followed by a
/// low-pass cascade at the high edge, each of the configured order.
pub struct BandPass {
    sections: Vec<Coefficients<f64>>,
    order: usize,
}

impl BandPass {
    pub fn design(band: PassBand, fs: f64, order: usize) -> Result<Self> {
        let order = order.max(1);
        let mut sections = Vec::new();
        if band.low > 0.0 {
            sections.extend(butterworth_sections(true, fs, band.low, order)?);
        }
        sections.extend(butterworth_sections(false, fs, band.high, order)?);
        Ok(Self { sections, order })
    }

    /// Odd-extension length at each end, as for a transfer function with
    /// `2 * order + 1` taps.
    fn pad_len(&self, n: usize) -> usize {
        (3 * (2 * self.order + 1)).min(n.saturating_sub(1))
    }

    /// Zero-phase filtering: every section runs forward then backward over an
    /// odd-reflected extension of the signal.
    pub fn apply(&self, signal: &[f64]) -> Vec<f64> {
        let n = signal.len();
        if n == 0 {
            return Vec::new();
        }
        let pad = self.pad_len(n);
        let mut ext = odd_extend(signal, pad);
        for coeffs in &self.sections {
            let mut stage = DirectForm1::<f64>::new(*coeffs);
            forward_backward_filter(&mut ext, &mut stage, dc_gain(coeffs));
        }
        ext[pad..pad + n].to_vec()
    }
}

fn odd_extend(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}

/// Band-limit one axis. Returns the input unchanged when the clamped band is
/// unusable or the design fails.
pub fn band_filter(signal: &[f64], fs: f64, config: &FilterConfig) -> Vec<f64> {
    let Some(band) = PassBand::clamp(config, fs) else {
        debug!("Pass band {}-{} Hz unusable at {} Hz, skipping filter", config.low_cut, config.high_cut, fs);
        return signal.to_vec();
    };
    match BandPass::design(band, fs, config.order) {
        Ok(bp) => bp.apply(signal),
        Err(e) => {
            debug!("Band-pass design failed ({}), skipping filter", e);
            signal.to_vec()
        }
    }
}
