//! Two-sample Kolmogorov-Smirnov test.

use super::sorted;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use statrs::function::factorial::ln_binomial;
use std::f64::consts::PI;

/// Outcome of a two-sample KS test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsResult {
    /// Largest distance between the two empirical CDFs, in [0, 1].
    pub statistic: f64,
    /// Two-sided p-value, in [0, 1].
    pub p_value: f64,
}

/// Compare the empirical distributions of two samples.
///
/// The p-value is exact when `reference.len() * target.len() <= exact_limit`
/// and uses the asymptotic Kolmogorov distribution otherwise.
pub fn ks_2samp(reference: &[f64], target: &[f64], exact_limit: usize) -> Result<KsResult> {
    if reference.is_empty() || target.is_empty() {
        return Err(AnalysisError::Computation(
            "KS test needs at least one value in each sample".to_string(),
        ));
    }

    let reference = sorted(reference);
    let target = sorted(target);
    let (n, m) = (reference.len(), target.len());

    let gap = max_cdf_gap(&reference, &target);
    let statistic = gap as f64 / (n as f64 * m as f64);

    let p_value = if n.saturating_mul(m) <= exact_limit {
        exact_p_value(n, m, gap)
    } else {
        asymptotic_p_value(n, m, statistic)
    };

    if !p_value.is_finite() {
        return Err(AnalysisError::Computation(format!(
            "KS p-value is not finite for samples of size {} and {}",
            n, m
        )));
    }

    Ok(KsResult {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Largest `|i * m - j * n|` over the merged sorted samples, where `i` and `j`
/// count the values `<=` the current point. Dividing by `n * m` gives D.
fn max_cdf_gap(a: &[f64], b: &[f64]) -> u64 {
    let (n, m) = (a.len() as u64, b.len() as u64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut gap = 0u64;

    while i < a.len() && j < b.len() {
        let value = a[i].min(b[j]);
        while i < a.len() && a[i] == value {
            i += 1;
        }
        while j < b.len() && b[j] == value {
            j += 1;
        }
        gap = gap.max((i as u64 * m).abs_diff(j as u64 * n));
    }

    // Once one sample is exhausted the gap only shrinks towards zero.
    gap
}

/// P(D >= observed) under the null, by counting monotone lattice paths from
/// (0, 0) to (n, m) that stay strictly inside the observed gap.
///
/// Path counts are rescaled after every row and the scale is tracked in log
/// space, so the count never overflows for large samples.
fn exact_p_value(n: usize, m: usize, gap: u64) -> f64 {
    if gap == 0 {
        return 1.0;
    }

    let (n64, m64) = (n as u64, m as u64);
    let inside = |i: usize, j: usize| (i as u64 * m64).abs_diff(j as u64 * n64) < gap;

    let mut row = vec![0.0f64; m + 1];
    let mut log_scale = 0.0f64;
    for i in 0..=n {
        for j in 0..=m {
            let paths = if i == 0 && j == 0 {
                1.0
            } else {
                let from_below = if i > 0 { row[j] } else { 0.0 };
                let from_left = if j > 0 { row[j - 1] } else { 0.0 };
                from_below + from_left
            };
            row[j] = if inside(i, j) { paths } else { 0.0 };
        }

        let peak = row.iter().copied().fold(0.0f64, f64::max);
        if peak == 0.0 {
            // every path has left the band
            return 1.0;
        }
        if peak > 1.0 {
            row.iter_mut().for_each(|paths| *paths /= peak);
            log_scale += peak.ln();
        }
    }

    if row[m] == 0.0 {
        return 1.0;
    }
    let inside_probability = (row[m].ln() + log_scale - ln_binomial(n64 + m64, n64)).exp();
    1.0 - inside_probability.min(1.0)
}

/// Asymptotic p-value with the Stephens small-sample correction.
fn asymptotic_p_value(n: usize, m: usize, statistic: f64) -> f64 {
    let en = (n as f64 * m as f64 / (n as f64 + m as f64)).sqrt();
    kolmogorov_sf((en + 0.12 + 0.11 / en) * statistic)
}

/// Survival function of the Kolmogorov distribution, `P(K > lambda)`.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if !(lambda > 0.0) {
        return 1.0;
    }

    let value = if lambda < 1.0 {
        // Jacobi theta form, converges quickly for small lambda.
        let factor = -(PI * PI) / (8.0 * lambda * lambda);
        let sum: f64 = (1..=20)
            .map(|k| {
                let odd = (2 * k - 1) as f64;
                (factor * odd * odd).exp()
            })
            .sum();
        1.0 - (2.0 * PI).sqrt() / lambda * sum
    } else {
        let sum: f64 = (1..=100)
            .map(|k: u32| {
                let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
                let k = f64::from(k);
                sign * (-2.0 * k * k * lambda * lambda).exp()
            })
            .sum();
        2.0 * sum
    };

    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXACT: usize = 10_000;

    #[test]
    fn test_identical_samples() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = ks_2samp(&values, &values, EXACT).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_statistic_partial_overlap() {
        let result = ks_2samp(&[1.0, 2.0, 3.0, 4.0], &[3.0, 4.0, 5.0, 6.0], EXACT).unwrap();
        assert!((result.statistic - 0.5).abs() < 1e-12);
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_statistic_is_order_independent() {
        let a = ks_2samp(&[5.0, 1.0, 3.0], &[2.0, 9.0, 4.0, 7.0], EXACT).unwrap();
        let b = ks_2samp(&[1.0, 3.0, 5.0], &[9.0, 7.0, 4.0, 2.0], EXACT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_p_value_fully_separated() {
        // Only the two extreme paths reach D = 1: 2 / C(10, 5).
        let result = ks_2samp(
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[6.0, 7.0, 8.0, 9.0, 10.0],
            EXACT,
        )
        .unwrap();
        assert_eq!(result.statistic, 1.0);
        assert!((result.p_value - 2.0 / 252.0).abs() < 1e-12);
    }

    #[test]
    fn test_asymptotic_p_value_fully_separated() {
        let result = ks_2samp(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0], 0).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert!(result.p_value < 0.01);
    }

    #[test]
    fn test_unequal_sizes() {
        let reference: Vec<f64> = (0..40).map(f64::from).collect();
        let target: Vec<f64> = (20..45).map(f64::from).collect();
        let result = ks_2samp(&reference, &target, EXACT).unwrap();
        assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        assert!((0.0..=1.0).contains(&result.p_value));
        assert!(result.p_value < 0.05);
    }

    #[test]
    fn test_empty_sample_is_error() {
        assert!(ks_2samp(&[], &[1.0], EXACT).is_err());
        assert!(ks_2samp(&[1.0], &[], EXACT).is_err());
    }

    #[test]
    fn test_kolmogorov_sf_known_values() {
        assert!((kolmogorov_sf(1.0) - 0.2700).abs() < 1e-3);
        assert!((kolmogorov_sf(0.5) - 0.9639).abs() < 1e-3);
        assert!((kolmogorov_sf(1.36) - 0.0494).abs() < 1e-3);
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        assert!(kolmogorov_sf(10.0) < 1e-12);
    }

    #[test]
    fn test_kolmogorov_sf_continuous_at_branch() {
        let below = kolmogorov_sf(1.0 - 1e-9);
        let above = kolmogorov_sf(1.0);
        assert!((below - above).abs() < 1e-6);
    }

    #[test]
    fn test_exact_p_value_large_samples_stays_finite() {
        // C(1200, 600) overflows f64, so the path counts must be rescaled.
        let reference: Vec<f64> = (0..600).map(f64::from).collect();
        let target: Vec<f64> = (300..900).map(f64::from).collect();
        let result = ks_2samp(&reference, &target, 1_000_000).unwrap();

        assert!((result.statistic - 0.5).abs() < 1e-12);
        assert!(result.p_value.is_finite());
        assert!(result.p_value < 1e-6);
    }

    #[test]
    fn test_exact_and_asymptotic_agree_on_moderate_samples() {
        let reference: Vec<f64> = (0..80).map(f64::from).collect();
        let target: Vec<f64> = (10..90).map(f64::from).collect();
        let exact = ks_2samp(&reference, &target, 1_000_000).unwrap();
        let asymptotic = ks_2samp(&reference, &target, 0).unwrap();

        assert_eq!(exact.statistic, asymptotic.statistic);
        assert!(exact.p_value > 0.05 && asymptotic.p_value > 0.05);
        assert!((exact.p_value - asymptotic.p_value).abs() < 0.2);
    }
}
