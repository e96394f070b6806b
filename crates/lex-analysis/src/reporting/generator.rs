use crate::dataset::{TabularData, TypeLabel};
use crate::quality::DataQualityChecker;
use crate::types::{DriftReport, NumericSummary, QualityAnalysis};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Report Records
// ============================================================================

/// Metadata describing a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub filename: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Size of the source file in bytes
    pub file_size: u64,
    pub column_types: HashMap<String, TypeLabel>,
    pub numeric_summary: HashMap<String, NumericSummary>,
    /// When the dataset was loaded for analysis
    pub upload_date: DateTime<Utc>,
}

impl DatasetSummary {
    /// Summarize a dataset read from `path`.
    ///
    /// The file size is taken from the filesystem; 0 when it cannot be read.
    /// Every summary gets a fresh id and the current time as its upload date.
    pub fn from_dataset<D: TabularData + ?Sized>(
        path: &Path,
        dataset: &D,
        checker: &DataQualityChecker,
    ) -> Self {
        let column_names = dataset.column_names().unwrap_or_default();
        let file_size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Self {
            id: Uuid::new_v4(),
            filename: display_name(path),
            rows: dataset.row_count(),
            columns: column_names.len(),
            column_names,
            file_size,
            column_types: checker.check_data_types(dataset),
            numeric_summary: checker.get_statistics(dataset).numeric_summary,
            upload_date: Utc::now(),
        }
    }
}

/// A stored quality analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReportRecord {
    pub id: Uuid,
    pub dataset_id: String,
    pub report_date: DateTime<Utc>,
    #[serde(flatten)]
    pub analysis: QualityAnalysis,
}

impl QualityReportRecord {
    pub fn new(dataset_id: impl Into<String>, analysis: QualityAnalysis) -> Self {
        Self {
            id: Uuid::new_v4(),
            dataset_id: dataset_id.into(),
            report_date: Utc::now(),
            analysis,
        }
    }
}

/// A stored drift comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReportRecord {
    pub id: Uuid,
    pub reference_dataset_id: String,
    pub target_dataset_id: String,
    pub report_date: DateTime<Utc>,
    #[serde(flatten)]
    pub report: DriftReport,
}

impl DriftReportRecord {
    pub fn new(
        reference_dataset_id: impl Into<String>,
        target_dataset_id: impl Into<String>,
        report: DriftReport,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_dataset_id: reference_dataset_id.into(),
            target_dataset_id: target_dataset_id.into(),
            report_date: Utc::now(),
            report,
        }
    }
}

/// File name without directories, falling back to the full path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Base name used for report files: the file stem of the dataset path.
pub fn report_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

// ============================================================================
// Report Generator
// ============================================================================

/// Writes report records as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a quality report to `<base>_quality_report.json`.
    pub fn write_quality_report(
        &self,
        record: &QualityReportRecord,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        self.write_json(record, &format!("{}_quality_report.json", report_base_name))
    }

    /// Write a drift report to `<base>_drift_report.json`.
    pub fn write_drift_report(
        &self,
        record: &DriftReportRecord,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        self.write_json(record, &format!("{}_drift_report.json", report_base_name))
    }

    fn write_json<T: Serialize>(&self, value: &T, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(file_name);
        let content = serde_json::to_string_pretty(value)?;
        let mut file = File::create(&report_path)?;
        file.write_all(content.as_bytes())?;
        debug!("Wrote {} bytes", content.len());

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::DriftDetector;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn sample_df() -> DataFrame {
        df![
            "x" => [1.0f64, 2.0, 3.0],
            "label" => ["a", "b", "a"],
        ]
        .unwrap()
    }

    #[test]
    fn test_dataset_summary() {
        let summary = DatasetSummary::from_dataset(
            Path::new("data/sample.csv"),
            &sample_df(),
            &DataQualityChecker::default(),
        );
        assert_eq!(summary.filename, "sample.csv");
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 2);
        assert_eq!(summary.column_names, vec!["x", "label"]);
        assert_eq!(summary.file_size, 0);
        assert_eq!(summary.column_types["label"], TypeLabel::Text);
        assert_eq!(summary.numeric_summary["x"].count, 3);
        assert!(!summary.numeric_summary.contains_key("label"));
    }

    #[test]
    fn test_dataset_summary_identity() {
        let before = Utc::now();
        let checker = DataQualityChecker::default();
        let first = DatasetSummary::from_dataset(Path::new("a.csv"), &sample_df(), &checker);
        let second = DatasetSummary::from_dataset(Path::new("a.csv"), &sample_df(), &checker);

        assert_ne!(first.id, second.id);
        assert!(first.upload_date >= before);
        assert!(second.upload_date >= first.upload_date);

        let json = serde_json::to_value(&first).unwrap();
        assert_eq!(json["id"], first.id.to_string());
        assert!(json["upload_date"].is_string());
    }

    #[test]
    fn test_report_base_name() {
        assert_eq!(report_base_name(Path::new("/tmp/train.csv")), "train");
        assert_eq!(report_base_name(Path::new("")), "dataset");
    }

    #[test]
    fn test_quality_record_flattens_analysis() {
        let analysis = DataQualityChecker::default().check_all(&sample_df());
        let record = QualityReportRecord::new("train", analysis);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["dataset_id"], "train");
        assert!(json["report_date"].is_string());
        assert_eq!(json["missing_values"]["total_rows"], 3);
        assert_eq!(json["data_types"]["x"], "float");
    }

    #[test]
    fn test_write_reports() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reports"));
        let df = sample_df();

        let analysis = DataQualityChecker::default().check_all(&df);
        let quality = QualityReportRecord::new("sample", analysis);
        let quality_path = generator.write_quality_report(&quality, "sample").unwrap();
        assert!(quality_path.ends_with("sample_quality_report.json"));

        let written: QualityReportRecord =
            serde_json::from_str(&fs::read_to_string(&quality_path).unwrap()).unwrap();
        assert_eq!(written.id, quality.id);
        assert_eq!(written.analysis.duplicates, quality.analysis.duplicates);

        let report = DriftDetector::default().detect_drift(&df, &df);
        let drift = DriftReportRecord::new("a", "b", report);
        let drift_path = generator.write_drift_report(&drift, "a_vs_b").unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&drift_path).unwrap()).unwrap();
        assert_eq!(json["reference_dataset_id"], "a");
        assert_eq!(json["drift_detected"], false);
        assert_eq!(json["test_results"]["total_columns_tested"], 2);
    }
}
