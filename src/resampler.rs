use rustfft::{num_complex::Complex, FftPlanner};

/// Output length when moving `len` samples from `source_rate` to
/// `target_rate` while compressing time by `speedup`.
pub fn compressed_len(len: usize, source_rate: f64, target_rate: f64, speedup: f64) -> usize {
    let n = len as f64 * target_rate / source_rate / speedup;
    if n.is_finite() && n > 0.0 { n as usize } else { 0 }
}

/// Fourier-domain resampling of a real signal to exactly `num` samples.
///
/// The spectrum is truncated or zero-padded around DC, with the Nyquist bin
/// split or folded for even lengths so a real input stays real, then
/// inverse-transformed. The signal is treated as periodic.
pub fn fourier_resample(signal: &[f64], num: usize) -> Vec<f64> {
    let nx = signal.len();
    if nx == 0 || num == 0 {
        return Vec::new();
    }
    if nx == num {
        return signal.to_vec();
    }

    let mut planner = FftPlanner::<f64>::new();
    let mut spectrum: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    planner.plan_fft_forward(nx).process(&mut spectrum);

    let n = nx.min(num);
    let mut out = vec![Complex::new(0.0, 0.0); num];
    let positive = (n + 1) / 2;
    out[..positive].copy_from_slice(&spectrum[..positive]);
    for k in 1..=(n - 1) / 2 {
        out[num - k] = spectrum[nx - k];
    }
    if n % 2 == 0 {
        let half = n / 2;
        if num < nx {
            // +N/2 and -N/2 land on the same output bin
            out[half] = spectrum[half] + spectrum[nx - half];
        } else {
            let split = spectrum[half] * 0.5;
            out[half] = split;
            out[num - half] = split;
        }
    }

    planner.plan_fft_inverse(num).process(&mut out);
    let scale = 1.0 / nx as f64;
    out.iter().map(|c| c.re * scale).collect()
}
