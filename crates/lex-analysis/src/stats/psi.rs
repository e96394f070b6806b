//! Population Stability Index.

use crate::error::{AnalysisError, Result};

/// Bin edges for PSI: `bins + 1` points spaced linearly between the reference
/// minimum and maximum, with the outer edges widened to -inf/+inf.
pub fn psi_breakpoints(reference: &[f64], bins: usize) -> Result<Vec<f64>> {
    if reference.is_empty() {
        return Err(AnalysisError::Computation(
            "PSI needs at least one reference value".to_string(),
        ));
    }
    if bins == 0 {
        return Err(AnalysisError::InvalidConfig(
            "PSI needs at least one bin".to_string(),
        ));
    }

    let min = reference.iter().copied().fold(f64::INFINITY, f64::min);
    let max = reference.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / bins as f64;

    let mut edges: Vec<f64> = (0..=bins).map(|i| min + step * i as f64).collect();
    edges[0] = f64::NEG_INFINITY;
    edges[bins] = f64::INFINITY;
    Ok(edges)
}

/// Fraction of values per bin. Bins are half-open `[left, right)` except the
/// last one; a value sitting on repeated edges lands in the right-most of them.
fn bin_fractions(values: &[f64], edges: &[f64]) -> Vec<f64> {
    let bins = edges.len() - 1;
    let mut counts = vec![0usize; bins];
    for value in values {
        let index = edges.partition_point(|edge| edge <= value);
        counts[index.saturating_sub(1).min(bins - 1)] += 1;
    }

    let total = values.len() as f64;
    counts.into_iter().map(|c| c as f64 / total).collect()
}

/// PSI = sum over bins of `(target - reference) * ln(target / reference)`,
/// with `epsilon` added to every bin fraction of both distributions.
pub fn population_stability_index(
    reference: &[f64],
    target: &[f64],
    bins: usize,
    epsilon: f64,
) -> Result<f64> {
    if target.is_empty() {
        return Err(AnalysisError::Computation(
            "PSI needs at least one target value".to_string(),
        ));
    }
    let edges = psi_breakpoints(reference, bins)?;

    let reference_dist = bin_fractions(reference, &edges);
    let target_dist = bin_fractions(target, &edges);

    let psi = reference_dist
        .iter()
        .zip(&target_dist)
        .map(|(r, t)| {
            let (r, t) = (r + epsilon, t + epsilon);
            (t - r) * (t / r).ln()
        })
        .sum();

    Ok(psi)
}
