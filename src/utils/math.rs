//! Mathematical utility functions

/// Linearly rescale `value` from `[min, max]` into `[0, 1]`, clamping out-of-range input.
/// Returns 0.0 for a degenerate range or a non-finite value.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !value.is_finite() || span.abs() < f64::EPSILON {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Unweighted arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_in_range() {
        assert!((normalize(80.0, 40.0, 120.0) - 0.5).abs() < 1e-12);
        assert_eq!(normalize(40.0, 40.0, 120.0), 0.0);
        assert_eq!(normalize(120.0, 40.0, 120.0), 1.0);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        assert_eq!(normalize(200.0, 40.0, 120.0), 1.0);
        assert_eq!(normalize(-5.0, 0.0, 10.0), 0.0);
        for v in [-1e9, -1.0, 10.000_001, 1e9] {
            let n = normalize(v, 0.0, 10.0);
            assert!(n == 0.0 || n == 1.0, "{v} -> {n}");
        }
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize(5.0, 3.0, 3.0), 0.0);
        assert_eq!(normalize(f64::NAN, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 1.0, 0.5, 0.0, 0.0, 1.0]) - 3.5 / 6.0).abs() < 1e-12);
    }
}
