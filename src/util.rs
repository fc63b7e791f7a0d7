use std::str::FromStr;

pub fn positive_parser(s: &str) -> Result<f64, String> {
    let s = s.trim();
    f64::from_str(s)
        .map_err(|e| format!("Invalid value '{}': {}", s, e))
        .and_then(|v| {
            if v > 0.0 && v.is_finite() {
                Ok(v)
            } else {
                Err(format!("Value must be positive, got {}", v))
            }
        })
}

pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if count == 0 { None } else { Some(sum / count as f64) }
}

/// Median of the finite values; even counts average the two middle values.
pub fn finite_median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().cloned().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Largest absolute value, ignoring NaN.
pub fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
}

pub fn linspace(start: f64, end: f64, num: usize, endpoint: bool) -> Vec<f64> {
    if num == 0 { return Vec::new(); }
    if num == 1 { return vec![start]; }
    let step = if endpoint {
        (end - start) / (num - 1) as f64
    } else {
        (end - start) / num as f64
    };
    (0..num).map(|i| start + i as f64 * step).collect()
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Samples for a duration in seconds at `fs`, rounded to nearest.
pub fn seconds_to_samples(seconds: f64, fs: f64) -> usize {
    (seconds * fs).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_parser() {
        assert_eq!(positive_parser("60"), Ok(60.0));
        assert_eq!(positive_parser(" 0.5 "), Ok(0.5));
        assert!(positive_parser("0").is_err());
        assert!(positive_parser("-3").is_err());
        assert!(positive_parser("abc").is_err());
    }

    #[test]
    fn test_finite_mean_skips_nan() {
        assert_eq!(finite_mean(&[1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(finite_mean(&[f64::NAN]), None);
        assert_eq!(finite_mean(&[]), None);
    }

    #[test]
    fn test_finite_median() {
        assert_eq!(finite_median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(finite_median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(finite_median(&[f64::NAN, 5.0, f64::INFINITY]), Some(5.0));
        assert_eq!(finite_median(&[]), None);
    }

    #[test]
    fn test_max_abs() {
        assert_eq!(max_abs(&[0.5, -2.0, f64::NAN, 1.0]), 2.0);
        assert_eq!(max_abs(&[]), 0.0);
    }

    #[test]
    fn test_math_helpers() {
        assert_eq!(linspace(0.0, 1.0, 3, true), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(0.0, 1.0, 4, false), vec![0.0, 0.25, 0.5, 0.75]);
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(seconds_to_samples(0.5, 200.0), 100);
        assert_eq!(seconds_to_samples(5.0, 90.0), 450);
    }
}
