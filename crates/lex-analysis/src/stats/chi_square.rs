//! Chi-square goodness-of-fit test.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Outcome of a chi-square goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    /// Degrees of freedom (categories - 1).
    pub dof: usize,
}

/// Test observed frequencies against expected frequencies.
///
/// Every expected frequency must be strictly positive; callers substitute a
/// smoothing constant for empty categories before calling. With fewer than two
/// categories there is nothing to compare and the p-value is 1.
pub fn chi_square_goodness_of_fit(observed: &[f64], expected: &[f64]) -> Result<ChiSquareResult> {
    if observed.len() != expected.len() {
        return Err(AnalysisError::Computation(format!(
            "chi-square needs matching frequency tables, got {} observed and {} expected",
            observed.len(),
            expected.len()
        )));
    }
    if observed.is_empty() {
        return Err(AnalysisError::Computation(
            "chi-square needs at least one category".to_string(),
        ));
    }
    if let Some(bad) = expected.iter().find(|e| !(**e > 0.0 && e.is_finite())) {
        return Err(AnalysisError::Computation(format!(
            "chi-square expected frequency must be positive, got {}",
            bad
        )));
    }

    let statistic: f64 = observed
        .iter()
        .zip(expected)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    let dof = observed.len() - 1;
    if dof == 0 {
        return Ok(ChiSquareResult {
            statistic,
            p_value: 1.0,
            dof,
        });
    }

    let distribution =
        ChiSquared::new(dof as f64).map_err(|e| AnalysisError::Computation(e.to_string()))?;
    let p_value = distribution.sf(statistic);
    if !p_value.is_finite() {
        return Err(AnalysisError::Computation(format!(
            "chi-square p-value is not finite for statistic {}",
            statistic
        )));
    }

    Ok(ChiSquareResult {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        dof,
    })
}
