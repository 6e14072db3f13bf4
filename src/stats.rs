//! Statistics primitives (C1).
//!
//! Median, percentile, MAD, coefficient of variation, the Mann-Whitney U
//! rank-sum test, and bootstrap resampling of the median difference. Every
//! reduction here rejects NaN/infinite input with `GateError::InvalidInput`
//! rather than silently propagating it, per `spec.md` §4.1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::GateError;

/// A sample of non-negative latency measurements (ms). Order carries no
/// meaning outside of bootstrap resampling, which is deterministic given a
/// fixed seed.
pub type Sample = [f64];

fn check_finite(x: &Sample) -> Result<(), GateError> {
    if x.is_empty() {
        return Err(GateError::InvalidInput("empty sample".to_string()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(GateError::InvalidInput(
            "sample contains NaN or infinite value".to_string(),
        ));
    }
    Ok(())
}

fn sorted(x: &Sample) -> Vec<f64> {
    let mut v = x.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).expect("non-finite value already rejected"));
    v
}

/// Linear-interpolation percentile (type-7 convention), `q` in `[0, 1]`.
///
/// `xs` must already be sorted ascending and non-empty.
fn percentile_sorted(xs: &[f64], q: f64) -> f64 {
    debug_assert!(!xs.is_empty());
    if xs.len() == 1 {
        return xs[0];
    }
    let n = xs.len();
    let rank = q * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return xs[lo];
    }
    let frac = rank - lo as f64;
    xs[lo] + frac * (xs[hi] - xs[lo])
}

/// Linear-interpolation percentile over an unsorted sample.
///
/// `q` must be in `[0, 1]`. Returns `EMPTY_SAMPLE`/`INVALID_INPUT` via
/// `GateError::InvalidInput` if `x` is empty or non-finite.
pub fn percentile(x: &Sample, q: f64) -> Result<f64, GateError> {
    check_finite(x)?;
    if !(0.0..=1.0).contains(&q) {
        return Err(GateError::InvalidInput(format!(
            "percentile q={q} out of [0,1]"
        )));
    }
    Ok(percentile_sorted(&sorted(x), q))
}

/// Median (50th percentile, linear interpolation for even-length samples).
pub fn median(x: &Sample) -> Result<f64, GateError> {
    percentile(x, 0.5)
}

/// Median absolute deviation from the sample median.
pub fn mad(x: &Sample) -> Result<f64, GateError> {
    let m = median(x)?;
    let deviations: Vec<f64> = x.iter().map(|v| (v - m).abs()).collect();
    median(&deviations)
}

/// Coefficient of variation (percent): sample standard deviation (n-1)
/// divided by the mean. `GateError::InvalidInput` when the mean is zero.
pub fn cv(x: &Sample) -> Result<f64, GateError> {
    check_finite(x)?;
    let n = x.len();
    let mean = x.iter().sum::<f64>() / n as f64;
    if mean == 0.0 {
        return Err(GateError::InvalidInput(
            "undefined coefficient of variation: mean is zero".to_string(),
        ));
    }
    if n < 2 {
        return Ok(0.0);
    }
    let variance = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Ok(variance.sqrt() / mean.abs() * 100.0)
}

/// Result of the Mann-Whitney U rank-sum test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSumResult {
    /// U statistic for the target group.
    pub u_target: f64,
    /// One-sided p-value for "target stochastically greater than baseline".
    pub p_greater: f64,
    /// P(T>B) = U_target / (n_b * n_t), ties contributing 0.5.
    pub prob_t_gt_b: f64,
}

/// Mann-Whitney U test via combined mid-ranking with tie correction.
///
/// Exact null distribution when `max(n_b, n_t) <= 20`; normal approximation
/// with continuity correction and tie-adjusted variance otherwise.
pub fn rank_sum_u(b: &Sample, t: &Sample) -> Result<RankSumResult, GateError> {
    check_finite(b)?;
    check_finite(t)?;

    let n_b = b.len();
    let n_t = t.len();

    let mut tagged: Vec<(f64, bool)> = Vec::with_capacity(n_b + n_t);
    tagged.extend(b.iter().map(|&v| (v, false)));
    tagged.extend(t.iter().map(|&v| (v, true)));
    tagged.sort_by(|a, bb| a.0.partial_cmp(&bb.0).expect("finite"));

    // Assign mid-ranks to tied groups.
    let n = tagged.len();
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    let mut tie_groups: Vec<usize> = Vec::new();
    while i < n {
        let mut j = i + 1;
        while j < n && tagged[j].0 == tagged[i].0 {
            j += 1;
        }
        let group_len = j - i;
        if group_len > 1 {
            tie_groups.push(group_len);
        }
        // Ranks are 1-indexed; mid-rank is the mean of the tied ranks' span.
        let mid_rank = ((i + 1) + j) as f64 / 2.0;
        for r in ranks.iter_mut().take(j).skip(i) {
            *r = mid_rank;
        }
        i = j;
    }

    let rank_sum_t: f64 = tagged
        .iter()
        .zip(ranks.iter())
        .filter(|((_, is_t), _)| *is_t)
        .map(|(_, r)| *r)
        .sum();

    let nb_f = n_b as f64;
    let nt_f = n_t as f64;
    let u_target = rank_sum_t - nt_f * (nt_f + 1.0) / 2.0;
    let prob_t_gt_b = if nb_f * nt_f > 0.0 {
        u_target / (nb_f * nt_f)
    } else {
        0.5
    };

    let p_greater = if n_b.max(n_t) <= crate::config::defaults::EXACT_MWU_MAX_N && tie_groups.is_empty() {
        exact_mwu_p_greater(n_b, n_t, u_target)
    } else {
        normal_approx_p_greater(u_target, nb_f, nt_f, n, &tie_groups)
    };

    Ok(RankSumResult {
        u_target,
        p_greater,
        prob_t_gt_b,
    })
}

/// Exact one-sided upper-tail p-value for U: `P(U' >= u_observed)` under the
/// Mann-Whitney null, computed from the exact counting distribution.
fn exact_mwu_p_greater(n_b: usize, n_t: usize, u_observed: f64) -> f64 {
    let max_u = n_b * n_t;
    let counts = exact_u_distribution(n_b, n_t);
    let total: f64 = counts.iter().sum();
    if total == 0.0 {
        return 1.0;
    }
    let u_round = u_observed.round().clamp(0.0, max_u as f64) as usize;
    let tail: f64 = counts[u_round..=max_u].iter().sum();
    (tail / total).clamp(0.0, 1.0)
}

/// Exact null distribution of the Mann-Whitney U statistic (no ties) for
/// `n_t` items drawn from `n_b + n_t` ranks, via the classical recurrence
/// `c(n_b, n_t, u) = c(n_b - 1, n_t, u - n_t) + c(n_b, n_t - 1, u)`, memoized
/// since `n_b, n_t <= 20` here.
fn exact_u_distribution(n_b: usize, n_t: usize) -> Vec<f64> {
    let max_u = n_b * n_t;
    let mut memo = std::collections::HashMap::new();
    fn c(
        nb: usize,
        nt: usize,
        u: i64,
        memo: &mut std::collections::HashMap<(usize, usize, i64), f64>,
    ) -> f64 {
        if u < 0 {
            return 0.0;
        }
        if nb == 0 && nt == 0 {
            return if u == 0 { 1.0 } else { 0.0 };
        }
        if let Some(&v) = memo.get(&(nb, nt, u)) {
            return v;
        }
        let mut val = 0.0;
        if nb > 0 {
            val += c(nb - 1, nt, u - nt as i64, memo);
        }
        if nt > 0 {
            val += c(nb, nt - 1, u, memo);
        }
        memo.insert((nb, nt, u), val);
        val
    }
    (0..=max_u)
        .map(|u| c(n_b, n_t, u as i64, &mut memo))
        .collect()
}

/// Normal approximation with continuity correction and tie-adjusted variance.
fn normal_approx_p_greater(
    u_target: f64,
    n_b: f64,
    n_t: f64,
    n_total: usize,
    tie_groups: &[usize],
) -> f64 {
    use statrs::distribution::{ContinuousCDF, Normal};

    let mean_u = n_b * n_t / 2.0;
    let n = n_total as f64;
    let tie_correction: f64 = tie_groups
        .iter()
        .map(|&t| {
            let t = t as f64;
            t.powi(3) - t
        })
        .sum();
    let variance = (n_b * n_t / 12.0) * ((n + 1.0) - tie_correction / (n * (n - 1.0)).max(1.0));
    if variance <= 0.0 {
        return if u_target > mean_u { 0.0 } else { 1.0 };
    }
    let sd = variance.sqrt();
    // continuity correction: shrink the gap between U and its mean by 0.5.
    let z = (u_target - mean_u - 0.5) / sd;
    let normal = Normal::new(0.0, 1.0).expect("standard normal is always valid");
    1.0 - normal.cdf(z)
}

/// Bootstrap confidence interval for `median(t) - median(b)`.
///
/// Draws `b_iters` independent paired resamples with replacement (size
/// `|b|` and `|t|` respectively), records the median difference for each,
/// and returns the `(alpha/2, 1-alpha/2)` percentiles plus the point
/// estimate from the original samples. Deterministic for a fixed `seed`.
pub fn bootstrap_median_diff(
    b: &Sample,
    t: &Sample,
    b_iters: usize,
    alpha: f64,
    seed: u64,
) -> Result<(f64, f64, f64), GateError> {
    check_finite(b)?;
    check_finite(t)?;

    let point = median(t)? - median(b)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut diffs = Vec::with_capacity(b_iters);

    for _ in 0..b_iters {
        let rb = resample(b, &mut rng);
        let rt = resample(t, &mut rng);
        let diff = median(&rt)? - median(&rb)?;
        diffs.push(diff);
    }
    diffs.sort_by(|a, c| a.partial_cmp(c).expect("finite"));

    let lo = percentile_sorted(&diffs, alpha / 2.0);
    let hi = percentile_sorted(&diffs, 1.0 - alpha / 2.0);
    Ok((lo, hi, point))
}

fn resample(x: &Sample, rng: &mut StdRng) -> Vec<f64> {
    (0..x.len()).map(|_| x[rng.gen_range(0..x.len())]).collect()
}
