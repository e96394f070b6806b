use crate::dataset::TypeLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Quality Report Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissingInfo {
    pub count: usize,
    /// Percentage of all rows, rounded to 2 decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub total_rows: usize,
    pub columns: HashMap<String, MissingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub total_rows: usize,
    pub unique_rows: usize,
    pub duplicate_count: usize,
    pub duplicate_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// IQR outlier summary for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierInfo {
    pub count: usize,
    /// Percentage of the non-missing values, rounded to 2 decimals.
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// Describe-style summary of a numeric column.
///
/// Everything except `count` is `None` when the column has no values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub numeric_summary: HashMap<String, NumericSummary>,
    pub categorical_summary: HashMap<String, Vec<ValueCount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All five quality checks for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityAnalysis {
    pub missing_values: MissingValueReport,
    pub duplicates: DuplicateReport,
    pub outliers: HashMap<String, OutlierInfo>,
    pub data_types: HashMap<String, TypeLabel>,
    pub statistics: StatisticsSummary,
}

// ============================================================================
// Drift Report Types
// ============================================================================

/// Which test produced a column result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftTest {
    #[serde(rename = "KS Test")]
    KolmogorovSmirnov,
    #[serde(rename = "Chi-Square Test")]
    ChiSquare,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericDriftStats {
    pub p_value: f64,
    /// Informational only; never affects `has_drift` or `drift_score`.
    pub psi_score: f64,
    pub reference_mean: f64,
    pub target_mean: f64,
    pub reference_std: f64,
    pub target_std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDriftStats {
    pub p_value: f64,
    pub reference_unique_values: usize,
    pub target_unique_values: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriftOutcome {
    Numeric(NumericDriftStats),
    Categorical(CategoricalDriftStats),
    Failed { error: String },
}

/// Per-column drift test result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDriftResult {
    pub column_name: String,
    pub test_type: DriftTest,
    pub has_drift: bool,
    /// The test statistic (KS D or chi-square), not the p-value.
    pub drift_score: f64,
    #[serde(flatten)]
    pub outcome: DriftOutcome,
}

impl ColumnDriftResult {
    /// Degraded result for a column whose test failed.
    pub fn failed(
        column_name: impl Into<String>,
        test_type: DriftTest,
        error: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            test_type,
            has_drift: false,
            drift_score: 0.0,
            outcome: DriftOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn p_value(&self) -> Option<f64> {
        match &self.outcome {
            DriftOutcome::Numeric(stats) => Some(stats.p_value),
            DriftOutcome::Categorical(stats) => Some(stats.p_value),
            DriftOutcome::Failed { .. } => None,
        }
    }

    pub fn psi_score(&self) -> Option<f64> {
        match &self.outcome {
            DriftOutcome::Numeric(stats) => Some(stats.psi_score),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            DriftOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftTestSummary {
    pub total_columns_tested: usize,
    pub columns_with_drift: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriftTestResults {
    Summary(DriftTestSummary),
    Failed { error: String },
}

/// Dataset-level drift verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub drift_detected: bool,
    pub overall_drift_score: f64,
    pub column_drift: HashMap<String, ColumnDriftResult>,
    pub test_results: DriftTestResults,
}

impl DriftReport {
    /// Aggregate per-column results into a report.
    ///
    /// The overall score is the mean of the per-column drift scores (0.0 with
    /// no columns) and drift is detected when it exceeds `threshold`.
    pub fn from_columns(columns: Vec<ColumnDriftResult>, threshold: f64) -> Self {
        let total_columns_tested = columns.len();
        let columns_with_drift = columns.iter().filter(|c| c.has_drift).count();
        let overall_drift_score = if columns.is_empty() {
            0.0
        } else {
            columns.iter().map(|c| c.drift_score).sum::<f64>() / columns.len() as f64
        };

        Self {
            drift_detected: overall_drift_score > threshold,
            overall_drift_score,
            column_drift: columns
                .into_iter()
                .map(|c| (c.column_name.clone(), c))
                .collect(),
            test_results: DriftTestResults::Summary(DriftTestSummary {
                total_columns_tested,
                columns_with_drift,
                threshold,
            }),
        }
    }

    /// Degenerate report for a failure outside any single column.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            drift_detected: false,
            overall_drift_score: 0.0,
            column_drift: HashMap::new(),
            test_results: DriftTestResults::Failed {
                error: error.into(),
            },
        }
    }

    pub fn summary(&self) -> Option<&DriftTestSummary> {
        match &self.test_results {
            DriftTestResults::Summary(summary) => Some(summary),
            DriftTestResults::Failed { .. } => None,
        }
    }

    /// Mean of the drift scores recorded in `column_drift`.
    pub fn mean_column_score(&self) -> f64 {
        if self.column_drift.is_empty() {
            return 0.0;
        }
        let total: f64 = self.column_drift.values().map(|c| c.drift_score).sum();
        total / self.column_drift.len() as f64
    }

    /// Names of the columns individually flagged, sorted.
    pub fn columns_with_drift(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .column_drift
            .values()
            .filter(|c| c.has_drift)
            .map(|c| c.column_name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}
