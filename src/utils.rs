/// Shared numeric helpers for the scoring and planning paths.
///
/// Every user-facing number in the pipeline is rounded at a fixed precision
/// (thresholds 1 decimal, scores/probabilities 2, quantities 6), so the
/// rounding lives in one place.

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to six decimal places (position quantities)
pub fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Clamp into [lo, hi]
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Replace non-finite values with a fallback
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding() {
        assert_eq!(round1(7.449), 7.4);
        assert_eq!(round2(0.255), 0.26);
        assert_eq!(round2(-1.005), -1.0);
        assert_eq!(round6(0.12345678), 0.123457);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(12.0, 5.0, 9.0), 9.0);
        assert_eq!(clamp(4.2, 5.0, 9.0), 5.0);
        assert_eq!(clamp(7.0, 5.0, 9.0), 7.0);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(f64::NAN, 1.0), 1.0);
        assert_eq!(finite_or(f64::INFINITY, 0.0), 0.0);
        assert_eq!(finite_or(2.5, 0.0), 2.5);
    }
}
