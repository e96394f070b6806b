use crate::config::AnalysisConfig;
use crate::dataset::{ColumnKind, TabularData};
use crate::error::{AnalysisError, Result};
use crate::stats::{
    chi_square_goodness_of_fit, ks_2samp, mean, population_stability_index, sample_std,
};
use crate::types::{
    CategoricalDriftStats, ColumnDriftResult, DriftOutcome, DriftReport, DriftTest,
    NumericDriftStats,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, warn};

/// Column-by-column drift detection between a reference and a target dataset.
///
/// Numeric columns get a two-sample KS test plus an informational PSI score,
/// everything else a chi-square test on value frequencies. The detector holds
/// only its configuration, so one instance can serve any number of concurrent
/// comparisons.
#[derive(Debug, Clone, Default)]
pub struct DriftDetector {
    config: AnalysisConfig,
}

static_assertions::assert_impl_all!(DriftDetector: Send, Sync);

impl DriftDetector {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Detector with default settings and the given significance threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self::new(AnalysisConfig {
            drift_threshold: threshold,
            ..Default::default()
        })
    }

    pub fn threshold(&self) -> f64 {
        self.config.drift_threshold
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compare every column present in both datasets.
    ///
    /// Never fails: a column whose test cannot run is reported with
    /// `has_drift = false`, score 0.0 and an error note, and a failure outside
    /// any single column yields [`DriftReport::failed`].
    pub fn detect_drift<R, T>(&self, reference: &R, target: &T) -> DriftReport
    where
        R: TabularData + ?Sized,
        T: TabularData + ?Sized,
    {
        self.try_detect_drift(reference, target)
            .unwrap_or_else(|e| {
                error!("Error detecting drift: {}", e);
                DriftReport::failed(e.to_string())
            })
    }

    fn try_detect_drift<R, T>(&self, reference: &R, target: &T) -> Result<DriftReport>
    where
        R: TabularData + ?Sized,
        T: TabularData + ?Sized,
    {
        let columns = common_columns(reference, target)?;
        debug!("Testing {} common columns for drift", columns.len());

        let mut results = Vec::with_capacity(columns.len());
        for column in columns {
            let result = match reference.column_kind(&column)? {
                ColumnKind::Numeric => self
                    .numeric_drift(reference, target, &column)
                    .unwrap_or_else(|e| column_failure(&column, DriftTest::KolmogorovSmirnov, e)),
                ColumnKind::Categorical => self
                    .categorical_drift(reference, target, &column)
                    .unwrap_or_else(|e| column_failure(&column, DriftTest::ChiSquare, e)),
            };

            debug!(
                "Column '{}': score {:.4}, p-value {:?}, drift {}",
                column,
                result.drift_score,
                result.p_value(),
                result.has_drift
            );
            results.push(result);
        }

        Ok(DriftReport::from_columns(results, self.config.drift_threshold))
    }

    fn numeric_drift<R, T>(
        &self,
        reference: &R,
        target: &T,
        column: &str,
    ) -> Result<ColumnDriftResult>
    where
        R: TabularData + ?Sized,
        T: TabularData + ?Sized,
    {
        let reference_values = reference.numeric_values(column)?;
        let target_values = target.numeric_values(column)?;
        if reference_values.is_empty() || target_values.is_empty() {
            return Err(AnalysisError::NoValidValues(column.to_string()));
        }

        let ks = ks_2samp(&reference_values, &target_values, self.config.exact_ks_limit)?;

        let psi_score = population_stability_index(
            &reference_values,
            &target_values,
            self.config.psi_bins,
            self.config.smoothing_epsilon,
        )
        .unwrap_or_else(|e| {
            warn!("PSI failed for column '{}': {}", column, e);
            0.0
        });

        Ok(ColumnDriftResult {
            column_name: column.to_string(),
            test_type: DriftTest::KolmogorovSmirnov,
            has_drift: ks.p_value < self.config.drift_threshold,
            drift_score: ks.statistic,
            outcome: DriftOutcome::Numeric(NumericDriftStats {
                p_value: ks.p_value,
                psi_score,
                reference_mean: mean(&reference_values),
                target_mean: mean(&target_values),
                reference_std: sample_std(&reference_values),
                target_std: sample_std(&target_values),
            }),
        })
    }

    fn categorical_drift<R, T>(
        &self,
        reference: &R,
        target: &T,
        column: &str,
    ) -> Result<ColumnDriftResult>
    where
        R: TabularData + ?Sized,
        T: TabularData + ?Sized,
    {
        let reference_values = reference.categorical_values(column)?;
        let target_values = target.categorical_values(column)?;
        if reference_values.is_empty() || target_values.is_empty() {
            return Err(AnalysisError::NoValidValues(column.to_string()));
        }

        let reference_counts = frequency_table(&reference_values);
        let target_counts = frequency_table(&target_values);
        let (observed, expected) = aligned_frequencies(
            &reference_counts,
            &target_counts,
            self.config.smoothing_epsilon,
        );

        let test = chi_square_goodness_of_fit(&observed, &expected)?;

        Ok(ColumnDriftResult {
            column_name: column.to_string(),
            test_type: DriftTest::ChiSquare,
            has_drift: test.p_value < self.config.drift_threshold,
            drift_score: test.statistic,
            outcome: DriftOutcome::Categorical(CategoricalDriftStats {
                p_value: test.p_value,
                reference_unique_values: reference_counts.len(),
                target_unique_values: target_counts.len(),
            }),
        })
    }
}

/// Log a failed column test and turn it into a degraded result.
fn column_failure(column: &str, test: DriftTest, e: AnalysisError) -> ColumnDriftResult {
    if e.is_data_error() {
        warn!("{:?} skipped for column '{}': {}", test, column, e);
    } else {
        error!("{:?} failed for column '{}': {}", test, column, e);
    }
    ColumnDriftResult::failed(column, test, e.to_string())
}

/// Names present in both datasets, sorted.
fn common_columns<R, T>(reference: &R, target: &T) -> Result<Vec<String>>
where
    R: TabularData + ?Sized,
    T: TabularData + ?Sized,
{
    let target_names: HashSet<String> = target.column_names()?.into_iter().collect();
    let mut common: Vec<String> = reference
        .column_names()?
        .into_iter()
        .filter(|name| target_names.contains(name))
        .collect();
    common.sort_unstable();
    common.dedup();
    Ok(common)
}

/// Value counts in first-seen order.
fn frequency_table(values: &[String]) -> Vec<(&str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut table: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match index.get(value.as_str()) {
            Some(&i) => table[i].1 += 1,
            None => {
                index.insert(value.as_str(), table.len());
                table.push((value.as_str(), 1));
            }
        }
    }
    table
}

/// Outer-join two frequency tables into (observed, expected) vectors.
///
/// Observed are the target counts, 0 where the target never saw a value.
/// Expected are the reference counts rescaled to the target total; a value
/// the reference never saw gets `epsilon` before rescaling so every expected
/// frequency stays positive.
fn aligned_frequencies(
    reference: &[(&str, usize)],
    target: &[(&str, usize)],
    epsilon: f64,
) -> (Vec<f64>, Vec<f64>) {
    let target_lookup: HashMap<&str, usize> = target.iter().copied().collect();
    let reference_lookup: HashMap<&str, usize> = reference.iter().copied().collect();

    let mut observed = Vec::with_capacity(reference.len() + target.len());
    let mut expected = Vec::with_capacity(reference.len() + target.len());

    for (value, count) in reference {
        observed.push(target_lookup.get(value).copied().unwrap_or(0) as f64);
        expected.push(*count as f64);
    }
    for (value, count) in target {
        if !reference_lookup.contains_key(value) {
            observed.push(*count as f64);
            expected.push(epsilon);
        }
    }

    let observed_total: f64 = observed.iter().sum();
    let expected_total: f64 = expected.iter().sum();
    if expected_total > 0.0 {
        let scale = observed_total / expected_total;
        expected.iter_mut().for_each(|e| *e *= scale);
    }

    (observed, expected)
}
