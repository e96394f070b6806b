use crate::config::AnalysisConfig;
use crate::dataset::{ColumnKind, TabularData, TypeLabel};
use crate::error::Result;
use crate::stats::{mean, quantile_sorted, sample_std, sorted};
use crate::types::{
    DuplicateReport, MissingInfo, MissingValueReport, NumericSummary, OutlierInfo,
    QualityAnalysis, StatisticsSummary, ValueCount,
};
use crate::utils::percentage;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Single-dataset quality checks.
///
/// Every check is independent and side-effect free. A failure of a whole
/// check is logged and turned into an empty result; a failure on one column is
/// logged and that column is left out.
#[derive(Debug, Clone, Default)]
pub struct DataQualityChecker {
    config: AnalysisConfig,
}

impl DataQualityChecker {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run all five checks.
    pub fn check_all<D: TabularData + ?Sized>(&self, dataset: &D) -> QualityAnalysis {
        QualityAnalysis {
            missing_values: self.check_missing_values(dataset),
            duplicates: self.check_duplicates(dataset),
            outliers: self.detect_outliers(dataset),
            data_types: self.check_data_types(dataset),
            statistics: self.get_statistics(dataset),
        }
    }

    /// Count missing values per column.
    pub fn check_missing_values<D: TabularData + ?Sized>(&self, dataset: &D) -> MissingValueReport {
        Self::try_missing_values(dataset).unwrap_or_else(|e| {
            error!("Error checking missing values: {}", e);
            MissingValueReport {
                error: Some(e.to_string()),
                ..Default::default()
            }
        })
    }

    fn try_missing_values<D: TabularData + ?Sized>(dataset: &D) -> Result<MissingValueReport> {
        let total_rows = dataset.row_count();
        let mut columns = HashMap::new();

        for name in dataset.column_names()? {
            match dataset.missing_count(&name) {
                Ok(count) => {
                    columns.insert(
                        name,
                        MissingInfo {
                            count,
                            percentage: percentage(count, total_rows),
                        },
                    );
                }
                Err(e) => warn!("Skipping missing-value count for '{}': {}", name, e),
            }
        }

        Ok(MissingValueReport {
            total_rows,
            columns,
            error: None,
        })
    }

    /// Count fully duplicated rows.
    pub fn check_duplicates<D: TabularData + ?Sized>(&self, dataset: &D) -> DuplicateReport {
        Self::try_duplicates(dataset).unwrap_or_else(|e| {
            error!("Error checking duplicates: {}", e);
            DuplicateReport {
                error: Some(e.to_string()),
                ..Default::default()
            }
        })
    }

    fn try_duplicates<D: TabularData + ?Sized>(dataset: &D) -> Result<DuplicateReport> {
        let total_rows = dataset.row_count();
        let unique_rows = dataset.distinct_row_count()?.min(total_rows);
        let duplicate_count = total_rows - unique_rows;

        Ok(DuplicateReport {
            total_rows,
            unique_rows,
            duplicate_count,
            duplicate_percentage: percentage(duplicate_count, total_rows),
            error: None,
        })
    }

    /// IQR outlier detection for numeric columns.
    pub fn detect_outliers<D: TabularData + ?Sized>(
        &self,
        dataset: &D,
    ) -> HashMap<String, OutlierInfo> {
        self.try_outliers(dataset).unwrap_or_else(|e| {
            error!("Error detecting outliers: {}", e);
            HashMap::new()
        })
    }

    fn try_outliers<D: TabularData + ?Sized>(
        &self,
        dataset: &D,
    ) -> Result<HashMap<String, OutlierInfo>> {
        let mut outliers = HashMap::new();

        for name in dataset.columns_of_kind(ColumnKind::Numeric)? {
            let values = match dataset.numeric_values(&name) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Skipping outlier detection for '{}': {}", name, e);
                    continue;
                }
            };
            if values.is_empty() {
                debug!("Column '{}' has no values, skipping outliers", name);
                continue;
            }

            let info = iqr_outliers(&values, self.config.iqr_multiplier);
            debug!(
                "Column '{}': {} outliers outside [{}, {}]",
                name, info.count, info.lower_bound, info.upper_bound
            );
            outliers.insert(name, info);
        }

        Ok(outliers)
    }

    /// Declared type label per column.
    pub fn check_data_types<D: TabularData + ?Sized>(
        &self,
        dataset: &D,
    ) -> HashMap<String, TypeLabel> {
        Self::try_data_types(dataset).unwrap_or_else(|e| {
            error!("Error checking data types: {}", e);
            HashMap::new()
        })
    }

    fn try_data_types<D: TabularData + ?Sized>(dataset: &D) -> Result<HashMap<String, TypeLabel>> {
        let mut types = HashMap::new();
        for name in dataset.column_names()? {
            match dataset.type_label(&name) {
                Ok(label) => {
                    types.insert(name, label);
                }
                Err(e) => warn!("Skipping type check for '{}': {}", name, e),
            }
        }
        Ok(types)
    }

    /// Numeric describe-style summaries and top values of the first
    /// categorical columns.
    pub fn get_statistics<D: TabularData + ?Sized>(&self, dataset: &D) -> StatisticsSummary {
        self.try_statistics(dataset).unwrap_or_else(|e| {
            error!("Error getting statistics: {}", e);
            StatisticsSummary {
                error: Some(e.to_string()),
                ..Default::default()
            }
        })
    }

    fn try_statistics<D: TabularData + ?Sized>(&self, dataset: &D) -> Result<StatisticsSummary> {
        let numeric_columns = dataset.columns_of_kind(ColumnKind::Numeric)?;
        let categorical_columns = dataset.columns_of_kind(ColumnKind::Categorical)?;

        let mut numeric_summary = HashMap::new();
        for name in &numeric_columns {
            match dataset.numeric_values(name) {
                Ok(values) => {
                    numeric_summary.insert(name.clone(), describe(&values));
                }
                Err(e) => warn!("Skipping summary for '{}': {}", name, e),
            }
        }

        let mut categorical_summary = HashMap::new();
        for name in categorical_columns
            .iter()
            .take(self.config.categorical_summary_columns)
        {
            match dataset.categorical_values(name) {
                Ok(values) => {
                    categorical_summary.insert(
                        name.clone(),
                        top_values(&values, self.config.top_value_count),
                    );
                }
                Err(e) => warn!("Skipping value counts for '{}': {}", name, e),
            }
        }

        Ok(StatisticsSummary {
            numeric_columns,
            categorical_columns,
            numeric_summary,
            categorical_summary,
            error: None,
        })
    }
}

/// Count values outside `[Q1 - k*IQR, Q3 + k*IQR]`.
///
/// `values` must be non-empty.
pub(crate) fn iqr_outliers(values: &[f64], multiplier: f64) -> OutlierInfo {
    let sorted = sorted(values);
    let q1 = quantile_sorted(&sorted, 0.25);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;

    let lower_bound = q1 - multiplier * iqr;
    let upper_bound = q3 + multiplier * iqr;
    let count = sorted
        .iter()
        .filter(|v| **v < lower_bound || **v > upper_bound)
        .count();

    OutlierInfo {
        count,
        percentage: percentage(count, sorted.len()),
        lower_bound,
        upper_bound,
    }
}

/// count, mean, std, min, quartiles, max.
pub(crate) fn describe(values: &[f64]) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary::default();
    }

    let sorted = sorted(values);
    NumericSummary {
        count: sorted.len(),
        mean: Some(mean(&sorted)),
        // sample std is undefined for a single value
        std: (sorted.len() > 1).then(|| sample_std(&sorted)),
        min: sorted.first().copied(),
        q25: Some(quantile_sorted(&sorted, 0.25)),
        q50: Some(quantile_sorted(&sorted, 0.5)),
        q75: Some(quantile_sorted(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Most frequent values, ties in first-seen order.
pub(crate) fn top_values(values: &[String], limit: usize) -> Vec<ValueCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in values {
        match index.get(value.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value.as_str(), counts.len());
                counts.push(ValueCount {
                    value: value.clone(),
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn sample_df() -> DataFrame {
        df![
            "id" => [1i64, 2, 3, 4, 5, 6],
            "value" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 100.0],
            "city" => [
                Some("Paris"),
                Some("Rome"),
                None,
                Some("Paris"),
                Some("Oslo"),
                Some("Rome")
            ],
            "flag" => [true, false, true, true, false, true],
        ]
        .unwrap()
    }

    /// Dataset whose `broken` column fails every per-column read.
    struct FlakyColumn;

    impl TabularData for FlakyColumn {
        fn row_count(&self) -> usize {
            3
        }

        fn column_names(&self) -> crate::error::Result<Vec<String>> {
            Ok(vec!["ok".to_string(), "broken".to_string()])
        }

        fn column_kind(&self, _column: &str) -> crate::error::Result<ColumnKind> {
            Ok(ColumnKind::Numeric)
        }

        fn type_label(&self, column: &str) -> crate::error::Result<TypeLabel> {
            match column {
                "ok" => Ok(TypeLabel::Float),
                _ => Err(AnalysisError::Computation("unreadable".to_string())),
            }
        }

        fn missing_count(&self, column: &str) -> crate::error::Result<usize> {
            match column {
                "ok" => Ok(0),
                _ => Err(AnalysisError::Computation("unreadable".to_string())),
            }
        }

        fn numeric_values(&self, column: &str) -> crate::error::Result<Vec<f64>> {
            match column {
                "ok" => Ok(vec![1.0, 2.0, 3.0]),
                _ => Err(AnalysisError::Computation("unreadable".to_string())),
            }
        }

        fn categorical_values(&self, _column: &str) -> crate::error::Result<Vec<String>> {
            Err(AnalysisError::Computation("unreadable".to_string()))
        }

        fn distinct_row_count(&self) -> crate::error::Result<usize> {
            Ok(3)
        }
    }

    /// Dataset that cannot even list its columns.
    struct Unreadable;

    impl TabularData for Unreadable {
        fn row_count(&self) -> usize {
            5
        }

        fn column_names(&self) -> crate::error::Result<Vec<String>> {
            Err(AnalysisError::Computation("storage offline".to_string()))
        }

        fn column_kind(&self, column: &str) -> crate::error::Result<ColumnKind> {
            Err(AnalysisError::ColumnNotFound(column.to_string()))
        }

        fn type_label(&self, column: &str) -> crate::error::Result<TypeLabel> {
            Err(AnalysisError::ColumnNotFound(column.to_string()))
        }

        fn missing_count(&self, column: &str) -> crate::error::Result<usize> {
            Err(AnalysisError::ColumnNotFound(column.to_string()))
        }

        fn numeric_values(&self, column: &str) -> crate::error::Result<Vec<f64>> {
            Err(AnalysisError::ColumnNotFound(column.to_string()))
        }

        fn categorical_values(&self, column: &str) -> crate::error::Result<Vec<String>> {
            Err(AnalysisError::ColumnNotFound(column.to_string()))
        }

        fn distinct_row_count(&self) -> crate::error::Result<usize> {
            Err(AnalysisError::Computation("storage offline".to_string()))
        }
    }

    #[test]
    fn test_missing_values() {
        let report = DataQualityChecker::default().check_missing_values(&sample_df());
        assert_eq!(report.total_rows, 6);
        assert_eq!(report.columns.len(), 4);
        assert_eq!(report.columns["city"].count, 1);
        assert_eq!(report.columns["city"].percentage, 16.67);
        assert_eq!(report.columns["id"].count, 0);
        assert!(report.error.is_none());

        for info in report.columns.values() {
            assert!((0.0..=100.0).contains(&info.percentage));
        }
    }

    #[test]
    fn test_missing_values_empty_dataset() {
        let df = df!["a" => Vec::<i64>::new()].unwrap();
        let report = DataQualityChecker::default().check_missing_values(&df);
        assert_eq!(report.total_rows, 0);
        assert_eq!(report.columns["a"].percentage, 0.0);
    }

    #[test]
    fn test_duplicates() {
        let df = df![
            "a" => [1i64, 1, 2, 1],
            "b" => ["x", "x", "y", "x"],
        ]
        .unwrap();
        let report = DataQualityChecker::default().check_duplicates(&df);
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.unique_rows, 2);
        assert_eq!(report.duplicate_count, 2);
        assert_eq!(report.duplicate_percentage, 50.0);
        assert_eq!(report.unique_rows + report.duplicate_count, report.total_rows);
    }

    #[test]
    fn test_duplicates_empty_dataset() {
        let report = DataQualityChecker::default().check_duplicates(&DataFrame::empty());
        assert_eq!(report.total_rows, 0);
        assert_eq!(report.duplicate_count, 0);
        assert_eq!(report.duplicate_percentage, 0.0);
    }

    #[test]
    fn test_outliers_single_extreme_value() {
        let outliers = DataQualityChecker::default().detect_outliers(&sample_df());

        let value = outliers["value"];
        assert_eq!(value.count, 1);
        assert_eq!(value.percentage, 16.67);
        assert!((value.lower_bound - (-1.5)).abs() < 1e-12);
        assert!((value.upper_bound - 8.5).abs() < 1e-12);

        assert_eq!(outliers["id"].count, 0);
        // categorical columns are not checked
        assert!(!outliers.contains_key("city"));
        assert!(!outliers.contains_key("flag"));
    }

    #[test]
    fn test_outliers_skip_empty_columns() {
        let df = df![
            "empty" => [None::<f64>, None, None],
            "full" => [1.0f64, 2.0, 3.0],
        ]
        .unwrap();
        let outliers = DataQualityChecker::default().detect_outliers(&df);
        assert!(!outliers.contains_key("empty"));
        assert_eq!(outliers["full"].count, 0);
    }

    #[test]
    fn test_outlier_multiplier_from_config() {
        let config = AnalysisConfig::builder().iqr_multiplier(100.0).build().unwrap();
        let outliers = DataQualityChecker::new(config).detect_outliers(&sample_df());
        assert_eq!(outliers["value"].count, 0);
    }

    #[test]
    fn test_data_types() {
        let types = DataQualityChecker::default().check_data_types(&sample_df());
        assert_eq!(types["id"], TypeLabel::Integer);
        assert_eq!(types["value"], TypeLabel::Float);
        assert_eq!(types["city"], TypeLabel::Text);
        assert_eq!(types["flag"], TypeLabel::Boolean);
    }

    #[test]
    fn test_statistics() {
        let stats = DataQualityChecker::default().get_statistics(&sample_df());
        assert_eq!(stats.numeric_columns, vec!["id", "value"]);
        assert_eq!(stats.categorical_columns, vec!["city", "flag"]);

        let value = stats.numeric_summary["value"];
        assert_eq!(value.count, 6);
        assert_eq!(value.min, Some(1.0));
        assert_eq!(value.max, Some(100.0));
        assert_eq!(value.q25, Some(2.25));
        assert_eq!(value.q50, Some(3.5));
        assert_eq!(value.q75, Some(4.75));
        assert!((value.mean.unwrap() - 115.0 / 6.0).abs() < 1e-12);

        let city = &stats.categorical_summary["city"];
        assert_eq!(
            city,
            &vec![
                ValueCount {
                    value: "Paris".to_string(),
                    count: 2,
                },
                ValueCount {
                    value: "Rome".to_string(),
                    count: 2,
                },
                ValueCount {
                    value: "Oslo".to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_statistics_limits_categorical_columns() {
        let config = AnalysisConfig::builder()
            .categorical_summary_columns(1)
            .top_value_count(1)
            .build()
            .unwrap();
        let stats = DataQualityChecker::new(config).get_statistics(&sample_df());
        assert_eq!(stats.categorical_summary.len(), 1);
        assert_eq!(stats.categorical_summary["city"].len(), 1);
        assert_eq!(stats.categorical_summary["city"][0].value, "Paris");
    }

    #[test]
    fn test_describe_single_value() {
        let summary = describe(&[7.0]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, Some(7.0));
        assert_eq!(summary.std, None);
        assert_eq!(summary.q50, Some(7.0));

        assert_eq!(describe(&[]), NumericSummary::default());
    }

    #[test]
    fn test_top_values_keeps_first_seen_order_on_ties() {
        let values: Vec<String> = ["b", "a", "c", "a", "b", "c"]
            .iter()
            .map(|v| v.to_string())
            .collect();
        let top = top_values(&values, 10);
        let order: Vec<&str> = top.iter().map(|v| v.value.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_per_column_failures_are_skipped() {
        let checker = DataQualityChecker::default();
        let dataset = FlakyColumn;

        let missing = checker.check_missing_values(&dataset);
        assert!(missing.error.is_none());
        assert!(missing.columns.contains_key("ok"));
        assert!(!missing.columns.contains_key("broken"));

        let outliers = checker.detect_outliers(&dataset);
        assert_eq!(outliers.len(), 1);

        let types = checker.check_data_types(&dataset);
        assert_eq!(types.len(), 1);

        let stats = checker.get_statistics(&dataset);
        assert!(stats.error.is_none());
        assert_eq!(stats.numeric_summary.len(), 1);
    }

    #[test]
    fn test_whole_check_failures_become_empty_results() {
        let analysis = DataQualityChecker::default().check_all(&Unreadable);

        assert!(analysis.missing_values.error.is_some());
        assert!(analysis.missing_values.columns.is_empty());
        assert!(analysis.duplicates.error.is_some());
        assert_eq!(analysis.duplicates.total_rows, 0);
        assert!(analysis.outliers.is_empty());
        assert!(analysis.data_types.is_empty());
        assert!(analysis.statistics.error.is_some());
    }

    #[test]
    fn test_check_all_through_trait_object() {
        let df = sample_df();
        let dataset: &dyn TabularData = &df;
        let analysis = DataQualityChecker::default().check_all(dataset);
        assert_eq!(analysis.missing_values.total_rows, 6);
        assert_eq!(analysis.duplicates.duplicate_count, 0);
        assert_eq!(analysis.outliers["value"].count, 1);
    }
}
