//! Statistical primitives shared by the quality and drift engines.
//!
//! Everything here works on plain `f64` slices that have already had missing
//! values removed, so the same code serves any [`TabularData`](crate::TabularData)
//! source.

mod chi_square;
mod ks;
mod psi;

pub use chi_square::{ChiSquareResult, chi_square_goodness_of_fit};
pub use ks::{KsResult, kolmogorov_sf, ks_2samp};
pub use psi::{population_stability_index, psi_breakpoints};

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// Returns 0.0 when there are fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }

    let mean = mean(values);
    let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Sorted copy of the values (total order, NaN last).
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile of already sorted values using linear interpolation between the
/// closest ranks (position `q * (n - 1)`).
pub fn quantile_sorted(values: &[f64], quantile: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let pos = quantile.clamp(0.0, 1.0) * (values.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return values[lower];
    }
    let weight = pos - lower as f64;
    values[lower] + (values[upper] - values[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sample_std_basic() {
        // Variance = 10 / 4 = 2.5
        let std = sample_std(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_std_degenerate() {
        assert_eq!(sample_std(&[5.0]), 0.0);
        assert_eq!(sample_std(&[]), 0.0);
        assert_eq!(sample_std(&[5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_sorted_handles_negative_and_duplicates() {
        assert_eq!(sorted(&[3.0, -1.0, 3.0, 0.5]), vec![-1.0, 0.5, 3.0, 3.0]);
    }

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!((quantile_sorted(&values, 0.25) - 2.25).abs() < 1e-12);
        assert!((quantile_sorted(&values, 0.5) - 3.5).abs() < 1e-12);
        assert!((quantile_sorted(&values, 0.75) - 4.75).abs() < 1e-12);
        assert_eq!(quantile_sorted(&values, 0.0), 1.0);
        assert_eq!(quantile_sorted(&values, 1.0), 100.0);
    }

    #[test]
    fn test_quantile_sorted_single_and_empty() {
        assert_eq!(quantile_sorted(&[7.0], 0.25), 7.0);
        assert_eq!(quantile_sorted(&[], 0.5), 0.0);
    }
}
