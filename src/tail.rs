//! Adaptive tail statistic (C4).
//!
//! The tail statistic is the arithmetic mean of the `k` largest values in a
//! sample, with `k` adapting to sample size so that single high percentiles
//! (unstable at small n) are replaced by a bounded-variance trimmed mean.

use crate::error::GateError;
use crate::stats::Sample;

/// `k = clamp(ceil(n * TAIL_METRIC_K_PCT), TAIL_METRIC_K_MIN, TAIL_METRIC_K_MAX)`.
#[must_use]
pub fn tail_k(n: usize, k_pct: f64, k_min: usize, k_max: usize) -> usize {
    let raw = (n as f64 * k_pct).ceil() as usize;
    raw.clamp(k_min, k_max).min(n.max(1))
}

/// Arithmetic mean of the `k` largest values (sort ascending, take the last
/// `k`; ties at the threshold rank are broken by sort stability).
pub fn tail_stat(x: &Sample, k_pct: f64, k_min: usize, k_max: usize) -> Result<f64, GateError> {
    if x.is_empty() {
        return Err(GateError::InvalidInput("empty sample".to_string()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(GateError::InvalidInput(
            "sample contains NaN or infinite value".to_string(),
        ));
    }
    let k = tail_k(x.len(), k_pct, k_min, k_max);
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
    let top = &sorted[sorted.len() - k..];
    Ok(top.iter().sum::<f64>() / k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_adaptivity_matches_spec_table() {
        // P6: n=10 -> k=2, n=30 -> k=3, n=50 -> k=5, n=100 -> k=5 (capped).
        assert_eq!(tail_k(10, 0.10, 2, 5), 2);
        assert_eq!(tail_k(30, 0.10, 2, 5), 3);
        assert_eq!(tail_k(50, 0.10, 2, 5), 5);
        assert_eq!(tail_k(100, 0.10, 2, 5), 5);
    }

    #[test]
    fn tail_stat_is_mean_of_top_k() {
        let x = vec![100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 150.0];
        // n=10 -> k=2: mean(100, 150) = 125
        assert_eq!(tail_stat(&x, 0.10, 2, 5).unwrap(), 125.0);
    }

    #[test]
    fn tail_stat_rejects_empty() {
        assert!(tail_stat(&[], 0.10, 2, 5).is_err());
    }
}
